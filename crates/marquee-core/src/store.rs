//! Record storage abstraction.

use serde::Serialize;

use crate::error::Result;
use crate::model::TitleRecord;

/// Effect of removing one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    /// Records that lost the snapshot but still have other entries.
    pub updated: usize,
    /// Records deleted because the snapshot was their only entry.
    pub deleted: usize,
}

impl RemovalReport {
    #[must_use]
    pub const fn affected(&self) -> usize {
        self.updated + self.deleted
    }
}

/// Keyed storage of [`TitleRecord`]s.
///
/// All calls are blocking. Implementations must be shareable across
/// threads so the enrichment job can run on its own task while queries and
/// imports use the same store.
pub trait RecordStore: Send + Sync {
    /// Look up one record by its external identifier.
    fn find_by_id(&self, id: &str) -> Result<Option<TitleRecord>>;

    /// Every record, ordered by identifier.
    fn find_all(&self) -> Result<Vec<TitleRecord>>;

    /// Records without a country of origin, ordered by identifier.
    fn find_missing_country(&self) -> Result<Vec<TitleRecord>>;

    /// Records that appeared in exactly the given snapshot.
    fn find_by_snapshot(&self, label: &str) -> Result<Vec<TitleRecord>>;

    /// Records having at least one snapshot label that contains `text`.
    fn find_by_snapshot_substring(&self, text: &str) -> Result<Vec<TitleRecord>>;

    /// Distinct snapshot labels across the store, in no particular order.
    fn snapshot_labels(&self) -> Result<Vec<String>>;

    /// Create or replace a record, including its full snapshot series.
    fn upsert(&self, record: &TitleRecord) -> Result<()>;

    /// Fill the country of a record that has none. Returns `false` if the
    /// record is missing or already has a country.
    fn set_country(&self, id: &str, country: &str) -> Result<bool>;

    /// Remove a record entirely. Returns `false` if it did not exist.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Drop every entry recorded under exactly `label`, deleting records
    /// left with no snapshot. Either all of it happens or none of it does.
    fn remove_snapshot(&self, label: &str) -> Result<RemovalReport>;
}
