//! Per-genre statistics.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use marquee_core::TitleRecord;

use crate::round::{mean_or_zero, round2};
use crate::years::rated_by;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreStat {
    pub genre: String,
    pub count: u64,
    /// Rounded to 2 decimals.
    pub avg_rating: f64,
}

/// The first entry of a comma-separated genre list, trimmed.
pub fn primary_genre(genres: &str) -> Option<&str> {
    genres
        .split(',')
        .next()
        .map(str::trim)
        .filter(|g| !g.is_empty())
}

/// Count and average personal rating per primary genre among records
/// rated on or before `cutoff`, ordered by count descending then genre.
pub fn genre_stats(records: &[TitleRecord], cutoff: NaiveDate) -> Vec<GenreStat> {
    let mut groups: HashMap<&str, Vec<&TitleRecord>> = HashMap::new();
    for record in records.iter().filter(|r| rated_by(r, cutoff)) {
        if let Some(genre) = primary_genre(&record.genres) {
            groups.entry(genre).or_default().push(record);
        }
    }

    let mut rows: Vec<GenreStat> = groups
        .into_iter()
        .map(|(genre, group)| GenreStat {
            genre: genre.to_string(),
            count: group.len() as u64,
            avg_rating: round2(mean_or_zero(
                group.iter().filter_map(|r| r.your_rating).map(f64::from),
            )),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, genres: &str, rating: Option<u32>) -> TitleRecord {
        let mut r = TitleRecord::new(id);
        r.genres = genres.to_string();
        r.your_rating = rating;
        r.date_rated = NaiveDate::from_ymd_opt(2024, 5, 1);
        r
    }

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_primary_genre() {
        assert_eq!(primary_genre("Drama, Thriller"), Some("Drama"));
        assert_eq!(primary_genre("  Comedy "), Some("Comedy"));
        assert_eq!(primary_genre(""), None);
        assert_eq!(primary_genre(" , Drama"), None);
    }

    #[test]
    fn test_only_first_genre_counts() {
        let records = vec![
            record("tt1", "Drama, Thriller", Some(8)),
            record("tt2", "Thriller", Some(6)),
        ];
        let stats = genre_stats(&records, cutoff());

        let drama = stats.iter().find(|s| s.genre == "Drama").unwrap();
        let thriller = stats.iter().find(|s| s.genre == "Thriller").unwrap();
        assert_eq!(drama.count, 1);
        assert_eq!(thriller.count, 1);
    }

    #[test]
    fn test_ordered_by_count_then_name() {
        let records = vec![
            record("tt1", "Horror", Some(5)),
            record("tt2", "Comedy", Some(7)),
            record("tt3", "Drama", Some(9)),
            record("tt4", "Drama, Crime", Some(8)),
            record("tt5", "", Some(8)),
        ];
        let genres: Vec<String> = genre_stats(&records, cutoff())
            .into_iter()
            .map(|s| s.genre)
            .collect();
        assert_eq!(genres, vec!["Drama", "Comedy", "Horror"]);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let records = vec![
            record("tt1", "Drama", Some(7)),
            record("tt2", "Drama", Some(7)),
            record("tt3", "Drama", Some(8)),
            record("tt4", "Drama", None),
        ];
        let stats = genre_stats(&records, cutoff());

        assert_eq!(stats[0].count, 4);
        assert!((stats[0].avg_rating - 7.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_records_after_cutoff_excluded() {
        let mut late = record("tt1", "Drama", Some(10));
        late.date_rated = NaiveDate::from_ymd_opt(2025, 3, 1);
        let mut undated = record("tt2", "Drama", Some(10));
        undated.date_rated = None;

        assert!(genre_stats(&[late, undated], cutoff()).is_empty());
    }
}
