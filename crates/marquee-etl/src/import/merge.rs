//! Merging one snapshot into the record store.

use std::io::Read;

use serde::Serialize;

use marquee_core::{Error, RecordStore, Result, SnapshotLabel};

use super::row::{ParsedRow, RawRow};

/// What happened to a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Imported,
    Skipped,
    Failed(String),
}

/// A row that could not be merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    pub reason: String,
}

/// Result of merging one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub label: String,
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
}

impl MergeReport {
    fn new(label: &SnapshotLabel) -> Self {
        Self {
            label: label.to_string(),
            imported: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }

    fn record(&mut self, row: usize, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Imported => self.imported += 1,
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::Failed(reason) => self.errors.push(RowError { row, reason }),
        }
    }

    fn log_summary(&self) {
        log::info!(
            "Snapshot {}: {} imported, {} skipped, {} failed",
            self.label,
            self.imported,
            self.skipped,
            self.errors.len()
        );
    }
}

/// Merges snapshot rows into per-title time series.
///
/// First sighting of an id creates the record with all descriptive fields;
/// later snapshots only add or overwrite the entry for their own label, so
/// merging the same snapshot twice leaves the store as merging it once.
pub struct SnapshotMerger<'a> {
    store: &'a dyn RecordStore,
}

impl std::fmt::Debug for SnapshotMerger<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotMerger").finish_non_exhaustive()
    }
}

impl<'a> SnapshotMerger<'a> {
    #[must_use]
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Merge already-split rows under `label`.
    ///
    /// # Errors
    /// Fails with [`Error::InvalidSnapshotLabel`] for a blank label and with
    /// [`Error::StoreUnavailable`] if the store goes away mid-import. Any
    /// other per-row failure is collected into the report.
    pub fn merge<I>(&self, label: &str, rows: I) -> Result<MergeReport>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let label = SnapshotLabel::new(label)?;
        let mut report = MergeReport::new(&label);

        for (i, raw) in rows.into_iter().enumerate() {
            let outcome = self.merge_row(&label, &raw)?;
            report.record(i + 1, outcome);
        }

        report.log_summary();
        Ok(report)
    }

    /// Read a CSV snapshot (header line first) and merge its rows.
    ///
    /// Rows the CSV reader cannot decode are reported as failed; an I/O
    /// failure of the underlying reader aborts the import.
    pub fn merge_csv<R: Read>(&self, label: &str, reader: R) -> Result<MergeReport> {
        let label = SnapshotLabel::new(label)?;
        let mut report = MergeReport::new(&label);

        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        for (i, result) in csv.records().enumerate() {
            let row = i + 1;
            let outcome = match result {
                Ok(record) => self.merge_row(&label, &RawRow::from(&record))?,
                Err(e) if e.is_io_error() => {
                    return Err(match e.into_kind() {
                        csv::ErrorKind::Io(io) => Error::Io(io),
                        other => Error::InvalidData(format!("{other:?}")),
                    });
                }
                Err(e) => {
                    log::warn!("Snapshot {}: unreadable row {}: {}", label, row, e);
                    RowOutcome::Failed(e.to_string())
                }
            };
            report.record(row, outcome);
        }

        report.log_summary();
        Ok(report)
    }

    /// Merge one row. Only a lost store is returned as an error.
    fn merge_row(&self, label: &SnapshotLabel, raw: &RawRow) -> Result<RowOutcome> {
        let Some(row) = ParsedRow::from_raw(raw) else {
            log::debug!(
                "Snapshot {}: skipping row with {} fields",
                label,
                raw.len()
            );
            return Ok(RowOutcome::Skipped);
        };

        match self.upsert_row(label, &row) {
            Ok(()) => Ok(RowOutcome::Imported),
            Err(e) if e.is_store_unavailable() => Err(e),
            Err(e) => {
                log::warn!("Snapshot {}: failed to merge {}: {}", label, row.id, e);
                Ok(RowOutcome::Failed(format!("{}: {}", row.id, e)))
            }
        }
    }

    fn upsert_row(&self, label: &SnapshotLabel, row: &ParsedRow) -> Result<()> {
        let mut record = match self.store.find_by_id(&row.id)? {
            Some(existing) => existing,
            None => row.to_new_record(),
        };

        record.record_snapshot(label.as_str(), row.snapshot_entry());
        self.store.upsert(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::{Database, RemovalReport, TitleRecord};
    use std::sync::Mutex;

    const HEADER: &str = "Const,Your Rating,Date Rated,Title,Original Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";

    fn csv_line(id: &str, title: &str, votes: &str, rating: &str) -> String {
        format!(
            "{id},8,2024-05-01,{title},{title},https://www.imdb.com/title/{id}/,Movie,{rating},100,1999,\"Drama, Thriller\",{votes},1999-01-01,Someone"
        )
    }

    fn snapshot(lines: &[String]) -> String {
        let mut text = String::from(HEADER);
        for line in lines {
            text.push('\n');
            text.push_str(line);
        }
        text
    }

    #[test]
    fn test_merge_creates_records() {
        let db = Database::open_in_memory().unwrap();
        let merger = SnapshotMerger::new(&db);
        let csv = snapshot(&[
            csv_line("tt1", "Heat", "100", "8.3"),
            csv_line("tt2", "Ronin", "50", "null"),
        ]);

        let report = merger.merge_csv("15.01.2025", csv.as_bytes()).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 0);
        assert!(report.errors.is_empty());

        let heat = db.find_by_id("tt1").unwrap().unwrap();
        assert_eq!(heat.title, "Heat");
        assert_eq!(heat.votes_at("15.01.2025"), Some(100));
        assert_eq!(heat.snapshot("15.01.2025").unwrap().rating, Some(8.3));

        let ronin = db.find_by_id("tt2").unwrap().unwrap();
        assert_eq!(ronin.snapshot("15.01.2025").unwrap().rating, None);
    }

    #[test]
    fn test_merge_is_idempotent_per_label() {
        let db = Database::open_in_memory().unwrap();
        let merger = SnapshotMerger::new(&db);
        let csv = snapshot(&[
            csv_line("tt1", "Heat", "100", "8.3"),
            csv_line("tt2", "Ronin", "50", "7.2"),
        ]);

        merger.merge_csv("15.01.2025", csv.as_bytes()).unwrap();
        let once = db.find_all().unwrap();
        merger.merge_csv("15.01.2025", csv.as_bytes()).unwrap();
        let twice = db.find_all().unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice[0].snapshot_dates(), vec!["15.01.2025"]);
    }

    #[test]
    fn test_later_snapshot_keeps_first_sighting_metadata() {
        let db = Database::open_in_memory().unwrap();
        let merger = SnapshotMerger::new(&db);

        let first = snapshot(&[csv_line("tt1", "Heat", "100", "8.3")]);
        let second = snapshot(&[csv_line("tt1", "Heat (Director's Cut)", "150", "8.4")]);
        merger.merge_csv("15.01.2025", first.as_bytes()).unwrap();
        merger.merge_csv("01.02.2025", second.as_bytes()).unwrap();

        let heat = db.find_by_id("tt1").unwrap().unwrap();
        assert_eq!(heat.title, "Heat");
        assert_eq!(heat.snapshot_dates(), vec!["15.01.2025", "01.02.2025"]);
        assert_eq!(heat.votes_at("15.01.2025"), Some(100));
        assert_eq!(heat.votes_at("01.02.2025"), Some(150));
    }

    #[test]
    fn test_reimport_overwrites_values_for_label() {
        let db = Database::open_in_memory().unwrap();
        let merger = SnapshotMerger::new(&db);

        let before = snapshot(&[csv_line("tt1", "Heat", "100", "8.3")]);
        let after = snapshot(&[csv_line("tt1", "Heat", "105", "")]);
        merger.merge_csv("15.01.2025", before.as_bytes()).unwrap();
        merger.merge_csv("15.01.2025", after.as_bytes()).unwrap();

        let heat = db.find_by_id("tt1").unwrap().unwrap();
        assert_eq!(heat.snapshot_dates(), vec!["15.01.2025"]);
        assert_eq!(heat.votes_at("15.01.2025"), Some(105));
        assert!(heat.ratings_by_snapshot().is_empty());
    }

    #[test]
    fn test_short_rows_are_skipped_not_failed() {
        let db = Database::open_in_memory().unwrap();
        let merger = SnapshotMerger::new(&db);
        let csv = snapshot(&[
            "tt9,7,2024-01-01,Short".to_string(),
            csv_line("tt1", "Heat", "100", "8.3"),
        ]);

        let report = merger.merge_csv("15.01.2025", csv.as_bytes()).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_blank_label_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let merger = SnapshotMerger::new(&db);

        let err = merger.merge("  ", Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshotLabel(_)));
    }

    #[test]
    fn test_merge_preserves_enriched_country() {
        let db = Database::open_in_memory().unwrap();
        let merger = SnapshotMerger::new(&db);
        let csv = snapshot(&[csv_line("tt1", "Heat", "100", "8.3")]);

        merger.merge_csv("15.01.2025", csv.as_bytes()).unwrap();
        db.set_country("tt1", "United States").unwrap();
        merger.merge_csv("01.02.2025", csv.as_bytes()).unwrap();

        let heat = db.find_by_id("tt1").unwrap().unwrap();
        assert_eq!(heat.country_of_origin.as_deref(), Some("United States"));
    }

    /// Delegates to a real database but refuses writes for chosen ids, or
    /// pretends to be gone entirely.
    struct FlakyStore {
        inner: Database,
        reject: Vec<&'static str>,
        unavailable: bool,
        writes: Mutex<usize>,
    }

    impl FlakyStore {
        fn new(reject: Vec<&'static str>, unavailable: bool) -> Self {
            Self {
                inner: Database::open_in_memory().unwrap(),
                reject,
                unavailable,
                writes: Mutex::new(0),
            }
        }
    }

    impl RecordStore for FlakyStore {
        fn find_by_id(&self, id: &str) -> Result<Option<TitleRecord>> {
            self.inner.find_by_id(id)
        }
        fn find_all(&self) -> Result<Vec<TitleRecord>> {
            self.inner.find_all()
        }
        fn find_missing_country(&self) -> Result<Vec<TitleRecord>> {
            self.inner.find_missing_country()
        }
        fn find_by_snapshot(&self, label: &str) -> Result<Vec<TitleRecord>> {
            self.inner.find_by_snapshot(label)
        }
        fn find_by_snapshot_substring(&self, text: &str) -> Result<Vec<TitleRecord>> {
            self.inner.find_by_snapshot_substring(text)
        }
        fn snapshot_labels(&self) -> Result<Vec<String>> {
            self.inner.snapshot_labels()
        }
        fn upsert(&self, record: &TitleRecord) -> Result<()> {
            let mut writes = self.writes.lock().unwrap();
            *writes += 1;
            if self.unavailable && *writes > 1 {
                return Err(Error::StoreUnavailable("disk detached".to_string()));
            }
            if self.reject.contains(&record.id.as_str()) {
                return Err(Error::InvalidData(format!("constraint failed for {}", record.id)));
            }
            self.inner.upsert(record)
        }
        fn set_country(&self, id: &str, country: &str) -> Result<bool> {
            self.inner.set_country(id, country)
        }
        fn delete(&self, id: &str) -> Result<bool> {
            self.inner.delete(id)
        }

        fn remove_snapshot(&self, label: &str) -> Result<RemovalReport> {
            self.inner.remove_snapshot(label)
        }
    }

    #[test]
    fn test_persistence_failure_is_per_row() {
        let store = FlakyStore::new(vec!["tt2"], false);
        let merger = SnapshotMerger::new(&store);
        let csv = snapshot(&[
            csv_line("tt1", "Heat", "100", "8.3"),
            csv_line("tt2", "Ronin", "50", "7.2"),
            csv_line("tt3", "Thief", "30", "7.4"),
        ]);

        let report = merger.merge_csv("15.01.2025", csv.as_bytes()).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 2);
        assert!(report.errors[0].reason.contains("tt2"));
        assert!(store.inner.find_by_id("tt3").unwrap().is_some());
    }

    #[test]
    fn test_unavailable_store_aborts_import() {
        let store = FlakyStore::new(Vec::new(), true);
        let merger = SnapshotMerger::new(&store);
        let csv = snapshot(&[
            csv_line("tt1", "Heat", "100", "8.3"),
            csv_line("tt2", "Ronin", "50", "7.2"),
        ]);

        let err = merger.merge_csv("15.01.2025", csv.as_bytes()).unwrap_err();
        assert!(err.is_store_unavailable());
    }

    #[test]
    fn test_merge_from_raw_rows() {
        let db = Database::open_in_memory().unwrap();
        let merger = SnapshotMerger::new(&db);
        let line = csv_line("tt1", "Heat", "100", "8.3");
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(line.as_bytes());
        let rows: Vec<RawRow> = reader
            .records()
            .map(|r| RawRow::from(&r.unwrap()))
            .collect();

        let report = merger.merge("15.01.2025", rows).unwrap();
        assert_eq!(report.imported, 1);
        assert!(db.find_by_id("tt1").unwrap().is_some());
    }
}
