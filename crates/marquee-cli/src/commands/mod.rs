pub mod config;
pub mod enrich;
pub mod import;
pub mod query;
pub mod snapshots;
pub mod status;

pub use enrich::run_enrich;
pub use import::run_import;
pub use snapshots::{list_snapshots, remove_snapshot};
pub use status::show_status;

use anyhow::{Context, Result};
use marquee_core::Database;
use marquee_etl::Config;
use serde::Serialize;

/// How command results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(self) -> bool {
        self.json
    }

    /// Print `value` as pretty JSON. Returns `false` in text mode so the
    /// caller can print its own rendering.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<bool> {
        if !self.json {
            return Ok(false);
        }
        let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{}", text);
        Ok(true)
    }
}

/// Open the configured database, creating its directory if needed.
pub fn open_database(config: &Config) -> Result<Database> {
    let db_path = &config.database_path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    Database::open(db_path).with_context(|| format!("Failed to open database {}", db_path.display()))
}
