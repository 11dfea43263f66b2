//! Deleting a whole snapshot.

use marquee_core::{Error, RecordStore, Result};

pub use marquee_core::RemovalReport;

/// Remove every entry recorded under `label`.
///
/// Records left with no snapshot at all are deleted, since nothing would
/// ever show them again. The store applies the removal atomically, so a
/// failure leaves every record as it was.
///
/// # Errors
/// [`Error::NotFound`] if no record carries the label.
pub fn remove_snapshot(store: &dyn RecordStore, label: &str) -> Result<RemovalReport> {
    let report = store.remove_snapshot(label)?;

    if report.affected() == 0 {
        return Err(Error::NotFound {
            entity: "snapshot",
            id: label.to_string(),
        });
    }

    log::info!(
        "Removed snapshot {}: {} records updated, {} deleted",
        label,
        report.updated,
        report.deleted
    );
    Ok(report)
}
