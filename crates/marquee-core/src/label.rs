//! Date and snapshot labels.
//!
//! Every date that crosses the query surface uses the `dd.MM.yyyy` textual
//! form. Snapshot labels are derived from export file names and are usually,
//! but not necessarily, dates in that same form.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%d.%m.%Y";
const CSV_SUFFIX: &str = ".csv";

/// A calendar date written as `dd.MM.yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateLabel(NaiveDate);

impl DateLabel {
    /// Parse a strict `dd.MM.yyyy` date.
    ///
    /// Single-digit days or months, other separators, and impossible dates
    /// (`31.02.2025`) are all rejected with [`Error::InvalidDateFormat`].
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidDateFormat(text.to_string());

        let bytes = text.as_bytes();
        let shape_ok = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                2 | 5 => *b == b'.',
                _ => b.is_ascii_digit(),
            });
        if !shape_ok {
            return Err(invalid());
        }

        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Parse an optional argument, falling back to today when it is absent
    /// or blank.
    pub fn parse_or_today(text: Option<&str>) -> Result<Self> {
        match text.map(str::trim) {
            Some(t) if !t.is_empty() => Self::parse(t),
            _ => Ok(Self::today()),
        }
    }

    /// Today's date in the local timezone.
    #[must_use]
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    #[must_use]
    pub const fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Identifier of one snapshot, taken from its source file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotLabel(String);

impl SnapshotLabel {
    /// Build a label from an already-derived string.
    pub fn new(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidSnapshotLabel(label.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derive a label from a file name (or path) by dropping the directory
    /// part and a `.csv` suffix: `exports/15.01.2025.csv` → `15.01.2025`.
    ///
    /// Only `.csv` is stripped, so an extensionless `15.01.2025` keeps its
    /// year.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let file_name = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name);

        let stem = file_name
            .len()
            .checked_sub(CSV_SUFFIX.len())
            .filter(|&at| {
                file_name.is_char_boundary(at) && file_name[at..].eq_ignore_ascii_case(CSV_SUFFIX)
            })
            .map_or(file_name, |at| &file_name[..at]);

        Self::new(stem).map_err(|_| Error::InvalidSnapshotLabel(name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The label as a date, when it is one.
    #[must_use]
    pub fn as_date(&self) -> Option<DateLabel> {
        DateLabel::parse(&self.0).ok()
    }
}

impl fmt::Display for SnapshotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SnapshotLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Chronological ordering for raw snapshot labels.
///
/// Labels that parse as dates come first, in date order; anything else
/// follows in plain lexical order.
pub fn chronological_cmp(a: &str, b: &str) -> Ordering {
    match (DateLabel::parse(a), DateLabel::parse(b)) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
