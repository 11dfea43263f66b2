use anyhow::{Context, Result};
use marquee_etl::{import_dir, import_file, MergeReport};
use std::path::PathBuf;

use super::{open_database, Output};

/// Row errors printed per snapshot before the rest are summarized.
const SHOWN_ERRORS: usize = 5;

pub fn run_import(config: &marquee_etl::Config, paths: &[PathBuf], output: Output) -> Result<()> {
    let db = open_database(config)?;
    let mut reports: Vec<MergeReport> = Vec::new();

    for path in paths {
        log::info!("Importing {}", path.display());
        if path.is_dir() {
            let found = import_dir(&db, path)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            if found.is_empty() {
                log::warn!("No .csv files in {}", path.display());
            }
            reports.extend(found);
        } else {
            let report = import_file(&db, path)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            reports.push(report);
        }
    }

    if output.json(&reports)? {
        return Ok(());
    }

    for report in &reports {
        print_report(report);
    }

    let imported: usize = reports.iter().map(|r| r.imported).sum();
    let failed: usize = reports.iter().map(|r| r.errors.len()).sum();
    println!(
        "\n✓ Imported {} rows from {} snapshot(s){}",
        imported,
        reports.len(),
        if failed > 0 {
            format!(", {} rows failed", failed)
        } else {
            String::new()
        }
    );

    Ok(())
}

fn print_report(report: &MergeReport) {
    println!(
        "  [{}] {} imported, {} skipped, {} failed",
        report.label,
        report.imported,
        report.skipped,
        report.errors.len()
    );
    for error in report.errors.iter().take(SHOWN_ERRORS) {
        eprintln!("    ✗ row {}: {}", error.row, error.reason);
    }
    if report.errors.len() > SHOWN_ERRORS {
        eprintln!("    ... and {} more", report.errors.len() - SHOWN_ERRORS);
    }
}
