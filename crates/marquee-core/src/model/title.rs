use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::label::chronological_cmp;

/// Values observed for a title in one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Vote count at the time of the snapshot. Absent when the export
    /// field did not parse.
    pub votes: Option<u32>,

    /// Aggregate external rating. Absent when the export left it empty or
    /// wrote `null`; a real `0.0` stays `Some(0.0)`.
    pub rating: Option<f64>,
}

impl SnapshotEntry {
    #[must_use]
    pub const fn new(votes: Option<u32>, rating: Option<f64>) -> Self {
        Self { votes, rating }
    }
}

/// One rated title merged across every snapshot it appeared in.
///
/// Descriptive and scalar fields are written on first sighting. The
/// per-snapshot values live in a single map keyed by snapshot label, so the
/// set of snapshot dates, the votes series, and the ratings series can never
/// disagree about which labels exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRecord {
    /// External catalog identifier (e.g. `tt0111161`).
    pub id: String,

    pub title: String,
    pub original_title: String,
    pub title_type: String,

    /// Comma-separated genre list as exported.
    pub genres: String,

    pub directors: String,
    pub url: String,

    /// Release date as exported; kept verbatim.
    pub release_date: String,

    /// Personal score.
    pub your_rating: Option<u32>,

    pub date_rated: Option<NaiveDate>,
    pub year: Option<i32>,
    pub runtime_minutes: Option<u32>,

    /// Set once by the country enrichment job.
    pub country_of_origin: Option<String>,

    snapshots: BTreeMap<String, SnapshotEntry>,
}

impl TitleRecord {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            original_title: String::new(),
            title_type: String::new(),
            genres: String::new(),
            directors: String::new(),
            url: String::new(),
            release_date: String::new(),
            your_rating: None,
            date_rated: None,
            year: None,
            runtime_minutes: None,
            country_of_origin: None,
            snapshots: BTreeMap::new(),
        }
    }

    /// Record (or overwrite) this title's values for a snapshot.
    pub fn record_snapshot(&mut self, label: impl Into<String>, entry: SnapshotEntry) {
        self.snapshots.insert(label.into(), entry);
    }

    /// Drop a snapshot's contribution. Returns `true` if it was present.
    pub fn remove_snapshot(&mut self, label: &str) -> bool {
        self.snapshots.remove(label).is_some()
    }

    #[must_use]
    pub fn snapshot(&self, label: &str) -> Option<&SnapshotEntry> {
        self.snapshots.get(label)
    }

    #[must_use]
    pub fn has_snapshot(&self, label: &str) -> bool {
        self.snapshots.contains_key(label)
    }

    /// Whether no snapshot references this title any more.
    #[must_use]
    pub fn is_orphaned(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Raw `(label, entry)` pairs in key order.
    pub fn snapshot_entries(&self) -> impl Iterator<Item = (&str, &SnapshotEntry)> {
        self.snapshots.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Labels of every snapshot containing this title, oldest first.
    #[must_use]
    pub fn snapshot_dates(&self) -> Vec<&str> {
        let mut dates: Vec<&str> = self.snapshots.keys().map(String::as_str).collect();
        dates.sort_by(|a, b| chronological_cmp(a, b));
        dates
    }

    /// Vote counts keyed by snapshot label; has exactly the keys of
    /// [`snapshot_dates`](Self::snapshot_dates).
    #[must_use]
    pub fn votes_by_snapshot(&self) -> BTreeMap<&str, Option<u32>> {
        self.snapshots
            .iter()
            .map(|(k, v)| (k.as_str(), v.votes))
            .collect()
    }

    /// External ratings keyed by snapshot label, only where one was present.
    #[must_use]
    pub fn ratings_by_snapshot(&self) -> BTreeMap<&str, f64> {
        self.snapshots
            .iter()
            .filter_map(|(k, v)| v.rating.map(|r| (k.as_str(), r)))
            .collect()
    }

    #[must_use]
    pub fn votes_at(&self, label: &str) -> Option<u32> {
        self.snapshots.get(label).and_then(|e| e.votes)
    }

    /// Set the country of origin if none is recorded yet.
    ///
    /// Returns `false` and leaves the record unchanged when a country is
    /// already present.
    pub fn fill_country(&mut self, country: impl Into<String>) -> bool {
        if self.country_of_origin.is_some() {
            return false;
        }
        self.country_of_origin = Some(country.into());
        true
    }

    /// `"<original title> (<year>)"`, or just the original title when the
    /// year is unknown.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.original_title, year),
            None => self.original_title.clone(),
        }
    }
}
