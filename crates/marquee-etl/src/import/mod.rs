//! Snapshot import.
//!
//! A snapshot is one ratings export; its label comes from the file name
//! (`15.01.2025.csv` is the snapshot `15.01.2025`).

pub mod merge;
pub mod remove;
pub mod row;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use marquee_core::{RecordStore, Result, SnapshotLabel};
use walkdir::WalkDir;

use merge::{MergeReport, SnapshotMerger};

/// Import one export file, labelled by its file name.
pub fn import_file(store: &dyn RecordStore, path: &Path) -> Result<MergeReport> {
    let label = SnapshotLabel::from_file_name(&path.to_string_lossy())?;
    log::info!("Importing {} as snapshot {}", path.display(), label);

    let file = File::open(path)?;
    SnapshotMerger::new(store).merge_csv(label.as_str(), BufReader::new(file))
}

/// Import every `.csv` file directly under `dir`, in file-name order.
///
/// Stops at the first file that fails as a whole; reports for files already
/// imported are lost in that case but their data stays in the store.
pub fn import_dir(store: &dyn RecordStore, dir: &Path) -> Result<Vec<MergeReport>> {
    let files = snapshot_files(dir);
    log::info!("Found {} snapshot files in {}", files.len(), dir.display());

    files.iter().map(|path| import_file(store, path)).collect()
}

fn snapshot_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.is_file() && is_csv(path))
        .collect();
    files.sort();
    files
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::{Database, Error};
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "Const,Your Rating,Date Rated,Title,Original Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";

    fn write_snapshot(dir: &Path, name: &str, votes: u32) -> PathBuf {
        let path = dir.join(name);
        let body = format!(
            "{HEADER}\ntt1,8,2024-05-01,Heat,Heat,https://www.imdb.com/title/tt1/,Movie,8.3,170,1995,\"Crime, Drama\",{votes},1995-12-15,Michael Mann\n"
        );
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_import_file_uses_file_name_as_label() {
        let temp = TempDir::new().unwrap();
        let path = write_snapshot(temp.path(), "15.01.2025.csv", 100);
        let db = Database::open_in_memory().unwrap();

        let report = import_file(&db, &path).unwrap();
        assert_eq!(report.label, "15.01.2025");
        assert_eq!(report.imported, 1);
        assert_eq!(db.snapshot_labels().unwrap(), vec!["15.01.2025".to_string()]);
    }

    #[test]
    fn test_import_extensionless_file_keeps_full_date() {
        let temp = TempDir::new().unwrap();
        let path = write_snapshot(temp.path(), "15.01.2025", 100);
        let db = Database::open_in_memory().unwrap();

        let report = import_file(&db, &path).unwrap();
        assert_eq!(report.label, "15.01.2025");
    }

    #[test]
    fn test_import_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();

        let err = import_file(&db, &temp.path().join("01.01.2025.csv")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_import_dir_only_csv_in_name_order() {
        let temp = TempDir::new().unwrap();
        write_snapshot(temp.path(), "b.csv", 200);
        write_snapshot(temp.path(), "a.CSV", 100);
        fs::write(temp.path().join("notes.txt"), "not a snapshot").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        write_snapshot(&temp.path().join("nested"), "c.csv", 300);

        let db = Database::open_in_memory().unwrap();
        let reports = import_dir(&db, temp.path()).unwrap();

        let labels: Vec<&str> = reports.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);

        let heat = db.find_by_id("tt1").unwrap().unwrap();
        assert_eq!(heat.votes_at("a"), Some(100));
        assert_eq!(heat.votes_at("b"), Some(200));
        assert!(!heat.has_snapshot("c"));
    }
}
