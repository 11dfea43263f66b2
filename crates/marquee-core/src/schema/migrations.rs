/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per rated title; descriptive fields come from first sighting
CREATE TABLE IF NOT EXISTS titles (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    original_title TEXT NOT NULL,
    title_type TEXT NOT NULL,
    genres TEXT NOT NULL,
    directors TEXT NOT NULL,
    url TEXT NOT NULL,
    release_date TEXT NOT NULL,
    your_rating INTEGER,
    date_rated TEXT,
    year INTEGER,
    runtime_minutes INTEGER,
    country_of_origin TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_titles_year ON titles(year);

-- Per-snapshot time series: one row per (title, snapshot label)
CREATE TABLE IF NOT EXISTS title_snapshots (
    title_id TEXT NOT NULL REFERENCES titles(id) ON DELETE CASCADE,
    snapshot_label TEXT NOT NULL,
    num_votes INTEGER,
    imdb_rating REAL,
    PRIMARY KEY (title_id, snapshot_label)
);

CREATE INDEX IF NOT EXISTS idx_title_snapshots_label ON title_snapshots(snapshot_label);
"#;

const MIGRATION_002: &str = r#"
-- Enrichment scans for titles that still lack a country
CREATE INDEX IF NOT EXISTS idx_titles_country ON titles(country_of_origin);
"#;

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: MIGRATION_001,
    },
    Migration {
        version: 2,
        name: "country_index",
        sql: MIGRATION_002,
    },
];
