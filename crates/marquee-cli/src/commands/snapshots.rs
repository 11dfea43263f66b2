use anyhow::Result;
use marquee_etl::Config;
use marquee_stats::Statistics;

use super::{open_database, Output};

pub fn list_snapshots(config: &Config, output: Output) -> Result<()> {
    let db = open_database(config)?;
    let labels = Statistics::new(&db).snapshot_labels()?;

    if output.json(&labels)? {
        return Ok(());
    }

    if labels.is_empty() {
        println!("No snapshots imported. Run 'marquee import <file.csv>' first.");
        return Ok(());
    }
    for label in &labels {
        println!("{}", label);
    }
    Ok(())
}

pub fn remove_snapshot(config: &Config, label: &str, output: Output) -> Result<()> {
    let db = open_database(config)?;
    let report = marquee_etl::remove_snapshot(&db, label)?;

    if output.json(&report)? {
        return Ok(());
    }

    println!("✓ Removed snapshot {}", label);
    println!("  Titles updated: {}", report.updated);
    println!("  Titles deleted: {}", report.deleted);
    Ok(())
}
