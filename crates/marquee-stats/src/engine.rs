//! Store-backed entry point for every aggregate view.

use chrono::Datelike;

use marquee_core::label::chronological_cmp;
use marquee_core::{DateLabel, RecordStore, Result};

use crate::compare::{compare, CompareRow};
use crate::counts::{country_counts, title_type_counts, NameCount};
use crate::genres::{genre_stats, GenreStat};
use crate::ratings::{ratings_at, SnapshotRating};
use crate::years::{year_counts, yearly_average, YearAverage, YearHistogram};

/// Aggregate queries over a [`RecordStore`].
///
/// Date arguments are `dd.MM.yyyy` text; `None` or a blank string means
/// today. Anything else that does not parse fails with
/// [`marquee_core::Error::InvalidDateFormat`].
pub struct Statistics<'a> {
    store: &'a dyn RecordStore,
}

impl std::fmt::Debug for Statistics<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statistics").finish_non_exhaustive()
    }
}

impl<'a> Statistics<'a> {
    #[must_use]
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Vote deltas between the snapshots labelled `from` and `to`.
    ///
    /// Both must be strict `dd.MM.yyyy` dates; unlike the other views there
    /// is no default.
    pub fn compare(&self, from: &str, to: &str, search: Option<&str>) -> Result<Vec<CompareRow>> {
        let from = DateLabel::parse(from.trim())?.to_string();
        let to = DateLabel::parse(to.trim())?.to_string();
        let records = self.store.find_all()?;
        Ok(compare(&records, &from, &to, search))
    }

    /// Release-year histogram of records seen in a snapshot whose label
    /// contains `from`.
    ///
    /// The match is a substring test on the label, so `01.2025` also
    /// matches `15.01.2025`.
    pub fn year_counts(&self, from: Option<&str>) -> Result<YearHistogram> {
        let from = DateLabel::parse_or_today(from)?;
        let records = self.store.find_by_snapshot_substring(&from.to_string())?;
        let through = DateLabel::today().date().year();
        log::debug!("Year counts from {}: {} records", from, records.len());
        Ok(year_counts(&records, through))
    }

    pub fn yearly_average(&self, cutoff: Option<&str>) -> Result<Vec<YearAverage>> {
        let cutoff = DateLabel::parse_or_today(cutoff)?;
        let records = self.store.find_all()?;
        Ok(yearly_average(&records, cutoff.date()))
    }

    pub fn genre_stats(&self, cutoff: Option<&str>) -> Result<Vec<GenreStat>> {
        let cutoff = DateLabel::parse_or_today(cutoff)?;
        let records = self.store.find_all()?;
        Ok(genre_stats(&records, cutoff.date()))
    }

    /// Title-type counts of records seen in a snapshot whose label contains
    /// `from` (same substring rule as [`year_counts`](Self::year_counts)).
    pub fn title_type_counts(&self, from: Option<&str>) -> Result<Vec<NameCount>> {
        let from = DateLabel::parse_or_today(from)?;
        let records = self.store.find_by_snapshot_substring(&from.to_string())?;
        Ok(title_type_counts(&records))
    }

    pub fn country_counts(&self) -> Result<Vec<NameCount>> {
        let records = self.store.find_all()?;
        Ok(country_counts(&records))
    }

    /// The snapshot labelled exactly `date`.
    pub fn ratings_by_snapshot(&self, date: Option<&str>) -> Result<Vec<SnapshotRating>> {
        let date = DateLabel::parse_or_today(date)?;
        let label = date.to_string();
        let records = self.store.find_by_snapshot(&label)?;
        Ok(ratings_at(&records, &label))
    }

    /// Every imported snapshot label, oldest first.
    pub fn snapshot_labels(&self) -> Result<Vec<String>> {
        let mut labels = self.store.snapshot_labels()?;
        labels.sort_by(|a, b| chronological_cmp(a, b));
        Ok(labels)
    }
}
