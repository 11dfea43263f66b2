//! Integration tests for importing snapshot files into an on-disk store.

use std::fs;
use std::path::{Path, PathBuf};

use marquee_core::{Database, RecordStore};
use marquee_etl::{import_dir, import_file, remove_snapshot};
use tempfile::TempDir;

const HEADER: &str = "Const,Your Rating,Date Rated,Title,Original Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";

fn write_export(dir: &Path, label: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(format!("{label}.csv"));
    let mut body = String::from(HEADER);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    fs::write(&path, body).expect("Failed to write export");
    path
}

const HEAT_JAN: &str = "tt0113277,9,2024-03-02,Heat,Heat,https://www.imdb.com/title/tt0113277/,Movie,8.3,170,1995,\"Action, Crime, Drama\",700000,1995-12-15,Michael Mann";
const HEAT_FEB: &str = "tt0113277,10,2025-01-20,Heat (Remastered),Heat,https://www.imdb.com/title/tt0113277/,Movie,8.4,171,1995,Drama,700050,1995-12-15,Someone Else";
const RONIN_JAN: &str = "tt0122690,7,2024-06-11,Ronin,Ronin,https://www.imdb.com/title/tt0122690/,Movie,7.2,122,1998,\"Action, Crime, Thriller\",230000,1998-09-25,John Frankenheimer";

/// Importing the same file twice leaves the store as importing it once.
#[test]
fn test_reimport_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path().join("test.db")).expect("Failed to open database");
    let path = write_export(temp_dir.path(), "15.01.2025", &[HEAT_JAN, RONIN_JAN]);

    let first = import_file(&db, &path).unwrap();
    let snapshot = db.find_all().unwrap();
    let second = import_file(&db, &path).unwrap();

    assert_eq!(first.imported, 2);
    assert_eq!(second.imported, 2);
    assert_eq!(db.find_all().unwrap(), snapshot);
}

/// Snapshot dates and per-snapshot votes always describe the same labels.
#[test]
fn test_series_stay_aligned_across_imports() {
    let temp_dir = TempDir::new().unwrap();
    let exports = temp_dir.path().join("exports");
    fs::create_dir(&exports).unwrap();
    write_export(&exports, "15.01.2025", &[HEAT_JAN, RONIN_JAN]);
    write_export(&exports, "01.02.2025", &[HEAT_FEB]);

    let db = Database::open(temp_dir.path().join("test.db")).unwrap();
    let reports = import_dir(&db, &exports).unwrap();
    assert_eq!(reports.len(), 2);

    for record in db.find_all().unwrap() {
        let dates = record.snapshot_dates();
        let mut vote_keys: Vec<&str> = record.votes_by_snapshot().into_keys().collect();
        let mut sorted_dates = dates.clone();
        sorted_dates.sort_unstable();
        vote_keys.sort_unstable();
        assert_eq!(sorted_dates, vote_keys, "{}", record.id);
    }

    let heat = db.find_by_id("tt0113277").unwrap().unwrap();
    assert_eq!(heat.snapshot_dates(), vec!["15.01.2025", "01.02.2025"]);
}

/// Later snapshots only add time-series entries.
#[test]
fn test_first_sighting_fields_survive_later_snapshots() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path().join("test.db")).unwrap();
    import_file(&db, &write_export(temp_dir.path(), "15.01.2025", &[HEAT_JAN])).unwrap();
    import_file(&db, &write_export(temp_dir.path(), "01.02.2025", &[HEAT_FEB])).unwrap();

    let heat = db.find_by_id("tt0113277").unwrap().unwrap();
    assert_eq!(heat.title, "Heat");
    assert_eq!(heat.directors, "Michael Mann");
    assert_eq!(heat.your_rating, Some(9));
    assert_eq!(heat.runtime_minutes, Some(170));
    assert_eq!(heat.votes_at("01.02.2025"), Some(700_050));
    assert_eq!(heat.ratings_by_snapshot().get("01.02.2025"), Some(&8.4));
}

/// Data survives closing and reopening the database file.
#[test]
fn test_store_persists_between_opens() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    {
        let db = Database::open(&db_path).unwrap();
        import_file(&db, &write_export(temp_dir.path(), "15.01.2025", &[HEAT_JAN])).unwrap();
    }

    let db = Database::open(&db_path).unwrap();
    assert_eq!(db.count_titles().unwrap(), 1);
    assert_eq!(db.snapshot_labels().unwrap(), vec!["15.01.2025".to_string()]);
}

/// Removing a snapshot undoes exactly its contribution.
#[test]
fn test_remove_snapshot_contribution() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path().join("test.db")).unwrap();
    import_file(&db, &write_export(temp_dir.path(), "15.01.2025", &[HEAT_JAN])).unwrap();
    let before = db.find_all().unwrap();

    import_file(&db, &write_export(temp_dir.path(), "01.02.2025", &[HEAT_FEB, RONIN_JAN])).unwrap();
    let report = remove_snapshot(&db, "01.02.2025").unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(db.find_all().unwrap(), before);
}
