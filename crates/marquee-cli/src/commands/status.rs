use anyhow::Result;
use marquee_etl::Config;
use marquee_stats::Statistics;
use serde::Serialize;
use std::path::PathBuf;

use super::{open_database, Output};

#[derive(Debug, Serialize)]
struct Status {
    database: PathBuf,
    schema_version: u32,
    titles: u64,
    missing_country: u64,
    snapshots: Vec<String>,
}

pub fn show_status(config: &Config, output: Output) -> Result<()> {
    let db = open_database(config)?;

    let status = Status {
        database: config.database_path.clone(),
        schema_version: db.schema_version()?,
        titles: db.count_titles()?,
        missing_country: db.count_missing_country()?,
        snapshots: Statistics::new(&db).snapshot_labels()?,
    };

    if output.json(&status)? {
        return Ok(());
    }

    println!("\n📊 Marquee Status\n");
    println!("  Database: {}", status.database.display());
    println!("  Schema version: {}", status.schema_version);
    println!("  Titles: {}", status.titles);
    println!("  Snapshots: {}", status.snapshots.len());
    if let (Some(first), Some(last)) = (status.snapshots.first(), status.snapshots.last()) {
        println!("    oldest: {}", first);
        println!("    newest: {}", last);
    }
    println!("  Without country: {}", status.missing_country);

    if status.titles == 0 {
        println!("\n  Run `marquee import <exports/>` to import snapshots");
    } else if status.missing_country > 0 {
        println!("\n  Run `marquee enrich` to look up missing countries");
    }

    Ok(())
}
