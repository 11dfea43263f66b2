//! The country-of-origin lookup capability.

use async_trait::async_trait;

use crate::error::EnrichResult;

/// Resolves a title to its country of origin.
///
/// `Ok(None)` means the source has no answer; errors are reported to the
/// caller, which decides whether they matter.
#[async_trait]
pub trait CountryLookup: Send + Sync {
    /// Short name of the source, for logs.
    fn source_name(&self) -> &str;

    async fn resolve(&self, title: &str, year: Option<i32>) -> EnrichResult<Option<String>>;
}

/// Free-text query for a title: `"Heat 1995"`, or just the title when the
/// year is unknown.
#[must_use]
pub fn search_query(title: &str, year: Option<i32>) -> String {
    let title = title.trim();
    match year {
        Some(year) => format!("{title} {year}"),
        None => title.to_string(),
    }
}
