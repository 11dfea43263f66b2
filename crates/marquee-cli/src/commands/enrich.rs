use anyhow::{Context, Result};
use marquee_etl::{Config, CountryFillJob, WikidataCountryLookup};
use std::sync::Arc;

use super::{open_database, Output};

pub async fn run_enrich(config: &Config, output: Output) -> Result<()> {
    log::info!("Starting country enrichment");

    let db = Arc::new(open_database(config)?);
    let missing = db.count_missing_country()?;
    if missing == 0 && !output.is_json() {
        println!("Every title already has a country of origin.");
        return Ok(());
    }

    let lookup = WikidataCountryLookup::new(&config.wikidata_user_agent)
        .context("Failed to create Wikidata client")?;
    let job = Arc::new(
        CountryFillJob::new(db, Arc::new(lookup)).with_pacing(config.enrichment_pacing()),
    );

    if !output.is_json() {
        println!(
            "Looking up {} titles ({} ms between lookups). Press Ctrl-C to stop.",
            missing,
            job.pacing().as_millis()
        );
    }

    let mut running = tokio::spawn({
        let job = Arc::clone(&job);
        async move { job.start().await }
    });

    let summary = tokio::select! {
        result = &mut running => result??,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nStopping after the current title...");
            job.request_cancel();
            running.await??
        }
    };

    if output.json(&summary)? {
        return Ok(());
    }

    println!(
        "\n{} Country fill {}",
        if summary.cancelled { "⏹" } else { "✓" },
        if summary.cancelled { "cancelled" } else { "complete" }
    );
    println!("  Updated:   {}", summary.updated);
    println!("  Not found: {}", summary.skipped);
    println!("  Failed:    {}", summary.failed);
    if summary.remaining() > 0 {
        println!("  Remaining: {}", summary.remaining());
        println!("\n  Run 'marquee enrich' again to continue");
    }

    Ok(())
}
