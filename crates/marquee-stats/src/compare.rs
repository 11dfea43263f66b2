//! Vote deltas between two snapshots.

use chrono::NaiveDate;
use serde::Serialize;

use marquee_core::TitleRecord;

/// One title present in both compared snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareRow {
    /// 1-based position in the result.
    pub id: usize,
    pub title_id: String,
    pub title: String,
    /// `"<original title> (<year>)"`.
    pub display_name: String,
    pub date_rated: Option<NaiveDate>,
    pub from_votes: u32,
    pub to_votes: u32,
    /// `to_votes - from_votes`; negative when votes were withdrawn.
    pub difference: i64,
    pub url: String,
}

/// Compare vote counts between snapshots `from` and `to`.
///
/// A record is included only when it has a vote count under both labels
/// and, if `search` is non-blank, one of its text fields contains it
/// (case-insensitive). Input order is kept.
pub fn compare(
    records: &[TitleRecord],
    from: &str,
    to: &str,
    search: Option<&str>,
) -> Vec<CompareRow> {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    records
        .iter()
        .filter(|r| match needle.as_deref() {
            Some(n) => matches_search(r, n),
            None => true,
        })
        .filter_map(|r| Some((r, r.votes_at(from)?, r.votes_at(to)?)))
        .enumerate()
        .map(|(i, (record, from_votes, to_votes))| CompareRow {
            id: i + 1,
            title_id: record.id.clone(),
            title: record.title.clone(),
            display_name: record.display_name(),
            date_rated: record.date_rated,
            from_votes,
            to_votes,
            difference: i64::from(to_votes) - i64::from(from_votes),
            url: record.url.clone(),
        })
        .collect()
}

/// `needle` must already be lowercase.
fn matches_search(record: &TitleRecord, needle: &str) -> bool {
    [
        &record.title,
        &record.original_title,
        &record.id,
        &record.title_type,
        &record.directors,
        &record.genres,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}
