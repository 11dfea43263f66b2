//! Per-release-year views.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use marquee_core::TitleRecord;

use crate::round::{format2, mean_or_zero};

/// First year of the dense histogram.
pub const FIRST_YEAR: i32 = 1874;

/// Records per release year, zero-filled over `FIRST_YEAR..=through_year`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearHistogram {
    pub counts: BTreeMap<i32, u64>,
    /// Sum of `counts`.
    pub total: u64,
    /// Records whose year falls outside the histogram range.
    pub out_of_range: u64,
}

impl YearHistogram {
    #[must_use]
    pub fn count(&self, year: i32) -> u64 {
        self.counts.get(&year).copied().unwrap_or(0)
    }

    /// Years with at least one record.
    pub fn non_zero(&self) -> impl Iterator<Item = (i32, u64)> + '_ {
        self.counts
            .iter()
            .filter(|(_, c)| **c > 0)
            .map(|(y, c)| (*y, *c))
    }
}

/// Count records per year over `FIRST_YEAR..=through_year`.
///
/// Years outside that range are tallied in `out_of_range` only. Records
/// without a year are not counted at all.
pub fn year_counts(records: &[TitleRecord], through_year: i32) -> YearHistogram {
    let range = FIRST_YEAR..=through_year.max(FIRST_YEAR);
    let mut counts: BTreeMap<i32, u64> = range.clone().map(|year| (year, 0)).collect();
    let mut out_of_range = 0;

    for year in records.iter().filter_map(|r| r.year) {
        match counts.get_mut(&year) {
            Some(count) => *count += 1,
            None => out_of_range += 1,
        }
    }
    if out_of_range > 0 {
        log::debug!("{} records outside {:?}", out_of_range, range);
    }

    let total = counts.values().sum();
    YearHistogram {
        counts,
        total,
        out_of_range,
    }
}

/// Personal-rating average for one release year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearAverage {
    pub year: i32,
    pub count: u64,
    /// Two decimals with a dot, e.g. `"7.50"`.
    pub avg_rating: String,
}

/// Average personal rating per release year among records rated on or
/// before `cutoff`, ordered by year.
///
/// Records without a rated date or a year are left out. A year whose
/// records carry no personal rating averages `"0.00"`.
pub fn yearly_average(records: &[TitleRecord], cutoff: NaiveDate) -> Vec<YearAverage> {
    let mut groups: BTreeMap<i32, Vec<&TitleRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| rated_by(r, cutoff)) {
        if let Some(year) = record.year {
            groups.entry(year).or_default().push(record);
        }
    }

    groups
        .into_iter()
        .map(|(year, group)| YearAverage {
            year,
            count: group.len() as u64,
            avg_rating: format2(mean_or_zero(
                group.iter().filter_map(|r| r.your_rating).map(f64::from),
            )),
        })
        .collect()
}

/// Whether the record was rated on or before `cutoff`.
pub(crate) fn rated_by(record: &TitleRecord, cutoff: NaiveDate) -> bool {
    record.date_rated.is_some_and(|d| d <= cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, year: Option<i32>, rating: Option<u32>, rated: Option<&str>) -> TitleRecord {
        let mut r = TitleRecord::new(id);
        r.year = year;
        r.your_rating = rating;
        r.date_rated = rated.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap());
        r
    }

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_year_counts_dense_and_total() {
        let records = vec![
            record("tt1", Some(1995), None, None),
            record("tt2", Some(1995), None, None),
            record("tt3", Some(2001), None, None),
            record("tt4", None, None, None),
        ];
        let histogram = year_counts(&records, 2025);

        assert_eq!(histogram.total, 3);
        assert_eq!(histogram.count(1995), 2);
        assert_eq!(histogram.count(2001), 1);
        assert_eq!(histogram.count(1874), 0);
        assert_eq!(histogram.counts.len(), (2025 - 1874 + 1) as usize);
        assert_eq!(histogram.counts.keys().next(), Some(&FIRST_YEAR));
        assert_eq!(histogram.non_zero().collect::<Vec<_>>(), vec![(1995, 2), (2001, 1)]);
    }

    #[test]
    fn test_year_counts_keep_outliers_out_of_range() {
        let records = vec![
            record("tt1", Some(1870), None, None),
            record("tt2", Some(2027), None, None),
            record("tt3", Some(2_000_000_000), None, None),
            record("tt4", Some(i32::MIN), None, None),
            record("tt5", Some(2025), None, None),
        ];
        let histogram = year_counts(&records, 2025);

        assert_eq!(histogram.counts.keys().next(), Some(&FIRST_YEAR));
        assert_eq!(histogram.counts.keys().next_back(), Some(&2025));
        assert_eq!(histogram.counts.len(), 152);
        assert_eq!(histogram.total, 1);
        assert_eq!(histogram.out_of_range, 4);
    }

    #[test]
    fn test_year_counts_empty() {
        let histogram = year_counts(&[], 2025);
        assert_eq!(histogram.total, 0);
        assert_eq!(histogram.out_of_range, 0);
        assert_eq!(histogram.counts.len(), 152);
    }

    #[test]
    fn test_yearly_average_formats_two_decimals() {
        let records = vec![
            record("tt1", Some(1999), Some(7), Some("2024-01-01")),
            record("tt2", Some(1999), Some(8), Some("2024-02-01")),
        ];
        let rows = yearly_average(&records, date("2025-01-01"));

        assert_eq!(
            rows,
            vec![YearAverage {
                year: 1999,
                count: 2,
                avg_rating: "7.50".to_string(),
            }]
        );
    }

    #[test]
    fn test_yearly_average_respects_cutoff() {
        let records = vec![
            record("tt1", Some(1999), Some(6), Some("2024-01-01")),
            record("tt2", Some(1999), Some(10), Some("2024-06-02")),
            record("tt3", Some(2005), Some(9), None),
        ];
        let rows = yearly_average(&records, date("2024-06-01"));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 1);
        assert_eq!(rows[0].avg_rating, "6.00");

        // The cutoff day itself is included.
        let rows = yearly_average(&records, date("2024-06-02"));
        assert_eq!(rows[0].avg_rating, "8.00");
    }

    #[test]
    fn test_yearly_average_ordered_and_unrated_is_zero() {
        let records = vec![
            record("tt1", Some(2010), None, Some("2024-01-01")),
            record("tt2", Some(1980), Some(5), Some("2024-01-01")),
        ];
        let rows = yearly_average(&records, date("2025-01-01"));

        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![1980, 2010]);
        assert_eq!(rows[1].avg_rating, "0.00");
        assert_eq!(rows[1].count, 1);
    }
}
