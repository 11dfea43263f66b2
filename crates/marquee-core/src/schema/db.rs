use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Params};

use crate::error::{Error, Result};
use crate::model::{SnapshotEntry, TitleRecord};
use crate::store::{RecordStore, RemovalReport};

use super::migrations::MIGRATIONS;

const TITLE_COLUMNS: &str = "t.id, t.title, t.original_title, t.title_type, t.genres,
    t.directors, t.url, t.release_date, t.your_rating, t.date_rated, t.year,
    t.runtime_minutes, t.country_of_origin";

/// A SQLite-backed [`RecordStore`].
///
/// The connection sits behind a mutex so one `Database` can be shared
/// between the import path and the enrichment task.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.apply_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::StoreUnavailable("connection lock poisoned".to_string()))
    }

    /// Number of applied schema migrations.
    pub fn schema_version(&self) -> Result<u32> {
        let conn = self.lock()?;
        let version: Option<u32> =
            conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })?;
        Ok(version.unwrap_or(0))
    }

    fn apply_migrations(&self) -> Result<()> {
        let conn = self.lock()?;

        // Create migrations table if it doesn't exist
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                conn.execute_batch(migration.sql)?;
                conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }

    /// Load records matching a `WHERE` fragment over `titles t`, with their
    /// snapshot series attached.
    fn query_records<P: Params + Copy>(
        conn: &Connection,
        filter: &str,
        params: P,
    ) -> Result<Vec<TitleRecord>> {
        let sql = format!("SELECT {TITLE_COLUMNS} FROM titles t WHERE {filter} ORDER BY t.id");
        let mut stmt = conn.prepare(&sql)?;
        let mut records = stmt
            .query_map(params, row_to_title)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if records.is_empty() {
            return Ok(records);
        }

        let index: HashMap<String, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();

        let sql = format!(
            "SELECT s.title_id, s.snapshot_label, s.num_votes, s.imdb_rating
             FROM title_snapshots s JOIN titles t ON t.id = s.title_id
             WHERE {filter}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                SnapshotEntry::new(row.get(2)?, row.get(3)?),
            ))
        })?;

        for row in rows {
            let (title_id, label, entry) = row?;
            if let Some(&i) = index.get(&title_id) {
                records[i].record_snapshot(label, entry);
            }
        }

        Ok(records)
    }
}

fn row_to_title(row: &rusqlite::Row) -> rusqlite::Result<TitleRecord> {
    let date_rated: Option<String> = row.get(9)?;
    let date_rated = date_rated
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))
        })
        .transpose()?;

    let mut record = TitleRecord::new(row.get::<_, String>(0)?);
    record.title = row.get(1)?;
    record.original_title = row.get(2)?;
    record.title_type = row.get(3)?;
    record.genres = row.get(4)?;
    record.directors = row.get(5)?;
    record.url = row.get(6)?;
    record.release_date = row.get(7)?;
    record.your_rating = row.get(8)?;
    record.date_rated = date_rated;
    record.year = row.get(10)?;
    record.runtime_minutes = row.get(11)?;
    record.country_of_origin = row.get(12)?;
    Ok(record)
}

impl RecordStore for Database {
    fn find_by_id(&self, id: &str) -> Result<Option<TitleRecord>> {
        let conn = self.lock()?;
        let mut records = Self::query_records(&conn, "t.id = ?1", [id])?;
        Ok(records.pop())
    }

    fn find_all(&self) -> Result<Vec<TitleRecord>> {
        let conn = self.lock()?;
        Self::query_records(&conn, "1 = 1", [])
    }

    fn find_missing_country(&self) -> Result<Vec<TitleRecord>> {
        let conn = self.lock()?;
        Self::query_records(&conn, "t.country_of_origin IS NULL", [])
    }

    fn find_by_snapshot(&self, label: &str) -> Result<Vec<TitleRecord>> {
        let conn = self.lock()?;
        Self::query_records(
            &conn,
            "EXISTS (SELECT 1 FROM title_snapshots s
                     WHERE s.title_id = t.id AND s.snapshot_label = ?1)",
            [label],
        )
    }

    fn find_by_snapshot_substring(&self, text: &str) -> Result<Vec<TitleRecord>> {
        let conn = self.lock()?;
        Self::query_records(
            &conn,
            "EXISTS (SELECT 1 FROM title_snapshots s
                     WHERE s.title_id = t.id AND instr(s.snapshot_label, ?1) > 0)",
            [text],
        )
    }

    fn snapshot_labels(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT DISTINCT snapshot_label FROM title_snapshots")?;
        let labels = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(labels)
    }

    fn upsert(&self, record: &TitleRecord) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // An upsert never clears a country that enrichment already filled.
        tx.execute(
            "INSERT INTO titles (
                id, title, original_title, title_type, genres, directors, url,
                release_date, your_rating, date_rated, year, runtime_minutes,
                country_of_origin
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                original_title = excluded.original_title,
                title_type = excluded.title_type,
                genres = excluded.genres,
                directors = excluded.directors,
                url = excluded.url,
                release_date = excluded.release_date,
                your_rating = excluded.your_rating,
                date_rated = excluded.date_rated,
                year = excluded.year,
                runtime_minutes = excluded.runtime_minutes,
                country_of_origin = COALESCE(titles.country_of_origin, excluded.country_of_origin),
                updated_at = datetime('now')",
            params![
                record.id,
                record.title,
                record.original_title,
                record.title_type,
                record.genres,
                record.directors,
                record.url,
                record.release_date,
                record.your_rating,
                record.date_rated.map(|d| d.format("%Y-%m-%d").to_string()),
                record.year,
                record.runtime_minutes,
                record.country_of_origin,
            ],
        )?;

        tx.execute(
            "DELETE FROM title_snapshots WHERE title_id = ?1",
            [&record.id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO title_snapshots (title_id, snapshot_label, num_votes, imdb_rating)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (label, entry) in record.snapshot_entries() {
                stmt.execute(params![record.id, label, entry.votes, entry.rating])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn set_country(&self, id: &str, country: &str) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE titles SET country_of_origin = ?2, updated_at = datetime('now')
             WHERE id = ?1 AND country_of_origin IS NULL",
            params![id, country],
        )?;
        Ok(changed == 1)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM title_snapshots WHERE title_id = ?1", [id])?;
        let changed = tx.execute("DELETE FROM titles WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(changed == 1)
    }

    fn remove_snapshot(&self, label: &str) -> Result<RemovalReport> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let ids: Vec<String> = {
            let mut stmt = tx.prepare(
                "SELECT title_id FROM title_snapshots WHERE snapshot_label = ?1 ORDER BY title_id",
            )?;
            let ids = stmt
                .query_map([label], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            ids
        };

        tx.execute(
            "DELETE FROM title_snapshots WHERE snapshot_label = ?1",
            [label],
        )?;

        let mut report = RemovalReport::default();
        {
            let mut orphan = tx.prepare(
                "DELETE FROM titles WHERE id = ?1
                 AND NOT EXISTS (SELECT 1 FROM title_snapshots WHERE title_id = ?1)",
            )?;
            let mut touch =
                tx.prepare("UPDATE titles SET updated_at = datetime('now') WHERE id = ?1")?;
            for id in &ids {
                if orphan.execute([id])? == 1 {
                    report.deleted += 1;
                } else {
                    touch.execute([id])?;
                    report.updated += 1;
                }
            }
        }

        tx.commit()?;
        Ok(report)
    }
}

impl Database {
    /// Count of stored titles.
    pub fn count_titles(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM titles", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Count of titles still lacking a country of origin.
    pub fn count_missing_country(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM titles WHERE country_of_origin IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Whether a title with this id exists, without loading its series.
    pub fn contains(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row("SELECT 1 FROM titles WHERE id = ?1", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }
}
