//! A single snapshot as a flat table.

use chrono::NaiveDate;
use serde::Serialize;

use marquee_core::TitleRecord;

/// One title as it stood in a given snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRating {
    pub id: String,
    pub title: String,
    pub original_title: String,
    pub url: String,
    pub title_type: String,
    pub imdb_rating: Option<f64>,
    pub runtime_minutes: Option<u32>,
    pub year: Option<i32>,
    pub your_rating: Option<u32>,
    pub date_rated: Option<NaiveDate>,
    pub genres: String,
    pub num_votes: Option<u32>,
    pub release_date: String,
    pub directors: String,
}

/// Every record carrying exactly `label`, with that snapshot's votes and
/// rating, ordered by title id.
pub fn ratings_at(records: &[TitleRecord], label: &str) -> Vec<SnapshotRating> {
    let mut rows: Vec<SnapshotRating> = records
        .iter()
        .filter_map(|r| r.snapshot(label).map(|entry| (r, entry)))
        .map(|(r, entry)| SnapshotRating {
            id: r.id.clone(),
            title: r.title.clone(),
            original_title: r.original_title.clone(),
            url: r.url.clone(),
            title_type: r.title_type.clone(),
            imdb_rating: entry.rating,
            runtime_minutes: r.runtime_minutes,
            year: r.year,
            your_rating: r.your_rating,
            date_rated: r.date_rated,
            genres: r.genres.clone(),
            num_votes: entry.votes,
            release_date: r.release_date.clone(),
            directors: r.directors.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));
    rows
}
