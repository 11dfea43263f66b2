//! Positional rows of a ratings export.

use std::str::FromStr;

use chrono::NaiveDate;
use marquee_core::{SnapshotEntry, TitleRecord};

/// Minimum number of fields a usable row carries.
pub const REQUIRED_FIELDS: usize = 14;

// Column positions in the export, header excluded.
const CONST: usize = 0;
const YOUR_RATING: usize = 1;
const DATE_RATED: usize = 2;
const TITLE: usize = 3;
const ORIGINAL_TITLE: usize = 4;
const URL: usize = 5;
const TITLE_TYPE: usize = 6;
const IMDB_RATING: usize = 7;
const RUNTIME: usize = 8;
const YEAR: usize = 9;
const GENRES: usize = 10;
const NUM_VOTES: usize = 11;
const RELEASE_DATE: usize = 12;
const DIRECTORS: usize = 13;

/// One data row of a snapshot, fields in export order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<String>,
}

impl RawRow {
    #[must_use]
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn field(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", String::as_str)
    }
}

impl From<&csv::StringRecord> for RawRow {
    fn from(record: &csv::StringRecord) -> Self {
        Self::new(record.iter().map(String::from).collect())
    }
}

impl<S: Into<String>> FromIterator<S> for RawRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// A row with every field interpreted.
///
/// Numeric fields that fail to parse become `None` instead of rejecting
/// the row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedRow {
    pub id: String,
    pub your_rating: Option<u32>,
    pub date_rated: Option<NaiveDate>,
    pub title: String,
    pub original_title: String,
    pub url: String,
    pub title_type: String,
    pub rating: Option<f64>,
    pub runtime_minutes: Option<u32>,
    pub year: Option<i32>,
    pub genres: String,
    pub votes: Option<u32>,
    pub release_date: String,
    pub directors: String,
}

impl ParsedRow {
    /// Interpret a raw row. Returns `None` for rows that should be skipped:
    /// too few fields or an empty identifier.
    pub fn from_raw(raw: &RawRow) -> Option<Self> {
        if raw.len() < REQUIRED_FIELDS {
            return None;
        }

        let id = raw.field(CONST).trim();
        if id.is_empty() {
            return None;
        }

        Some(Self {
            id: id.to_string(),
            your_rating: parse_optional(raw.field(YOUR_RATING)),
            date_rated: NaiveDate::parse_from_str(raw.field(DATE_RATED).trim(), "%Y-%m-%d").ok(),
            title: raw.field(TITLE).to_string(),
            original_title: raw.field(ORIGINAL_TITLE).to_string(),
            url: raw.field(URL).to_string(),
            title_type: raw.field(TITLE_TYPE).to_string(),
            rating: parse_rating(raw.field(IMDB_RATING)),
            runtime_minutes: parse_optional(raw.field(RUNTIME)),
            year: parse_optional(raw.field(YEAR)),
            genres: raw.field(GENRES).to_string(),
            votes: parse_optional(raw.field(NUM_VOTES)),
            release_date: raw.field(RELEASE_DATE).to_string(),
            directors: raw.field(DIRECTORS).to_string(),
        })
    }

    /// A fresh record populated from this row (first sighting).
    pub fn to_new_record(&self) -> TitleRecord {
        let mut record = TitleRecord::new(self.id.clone());
        record.title.clone_from(&self.title);
        record.original_title.clone_from(&self.original_title);
        record.title_type.clone_from(&self.title_type);
        record.genres.clone_from(&self.genres);
        record.directors.clone_from(&self.directors);
        record.url.clone_from(&self.url);
        record.release_date.clone_from(&self.release_date);
        record.your_rating = self.your_rating;
        record.date_rated = self.date_rated;
        record.year = self.year;
        record.runtime_minutes = self.runtime_minutes;
        record
    }

    pub const fn snapshot_entry(&self) -> SnapshotEntry {
        SnapshotEntry::new(self.votes, self.rating)
    }
}

fn parse_optional<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

/// The external rating: empty, `null`, non-finite, or garbage all mean
/// "not rated".
fn parse_rating(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }
    value.parse().ok().filter(|v: &f64| v.is_finite())
}
