//! Aggregate views printed as plain tables.

use anyhow::Result;
use marquee_etl::Config;
use marquee_stats::Statistics;

use super::{open_database, Output};

pub fn compare(
    config: &Config,
    from: &str,
    to: &str,
    search: Option<&str>,
    sort: bool,
    output: Output,
) -> Result<()> {
    let db = open_database(config)?;
    let mut rows = Statistics::new(&db).compare(from, to, search)?;
    if sort {
        rows.sort_by(|a, b| b.difference.cmp(&a.difference));
    }

    if output.json(&rows)? {
        return Ok(());
    }

    if rows.is_empty() {
        println!("No titles have votes in both {} and {}", from, to);
        return Ok(());
    }

    println!("{:>5}  {:<48} {:>10} {:>10} {:>8}", "#", "Title", from, to, "Diff");
    for row in &rows {
        println!(
            "{:>5}  {:<48} {:>10} {:>10} {:>+8}",
            row.id,
            truncate(&row.display_name, 48),
            row.from_votes,
            row.to_votes,
            row.difference
        );
    }
    println!("\n{} titles", rows.len());
    Ok(())
}

pub fn years(config: &Config, from: Option<&str>, all: bool, output: Output) -> Result<()> {
    let db = open_database(config)?;
    let histogram = Statistics::new(&db).year_counts(from)?;

    if output.json(&histogram)? {
        return Ok(());
    }

    if all {
        for (year, count) in &histogram.counts {
            println!("{}  {:>6}", year, count);
        }
    } else {
        for (year, count) in histogram.non_zero() {
            println!("{}  {:>6}", year, count);
        }
    }
    println!("\nTotal: {}", histogram.total);
    if histogram.out_of_range > 0 {
        println!("Outside the year range: {}", histogram.out_of_range);
    }
    Ok(())
}

pub fn yearly_average(config: &Config, cutoff: Option<&str>, output: Output) -> Result<()> {
    let db = open_database(config)?;
    let rows = Statistics::new(&db).yearly_average(cutoff)?;

    if output.json(&rows)? {
        return Ok(());
    }

    println!("{:<6} {:>6} {:>8}", "Year", "Count", "Avg");
    for row in &rows {
        println!("{:<6} {:>6} {:>8}", row.year, row.count, row.avg_rating);
    }
    Ok(())
}

pub fn genres(config: &Config, cutoff: Option<&str>, output: Output) -> Result<()> {
    let db = open_database(config)?;
    let rows = Statistics::new(&db).genre_stats(cutoff)?;

    if output.json(&rows)? {
        return Ok(());
    }

    println!("{:<20} {:>6} {:>8}", "Genre", "Count", "Avg");
    for row in &rows {
        println!("{:<20} {:>6} {:>8.2}", row.genre, row.count, row.avg_rating);
    }
    Ok(())
}

pub fn title_types(config: &Config, from: Option<&str>, output: Output) -> Result<()> {
    let db = open_database(config)?;
    let rows = Statistics::new(&db).title_type_counts(from)?;

    if output.json(&rows)? {
        return Ok(());
    }

    for row in &rows {
        println!("{:<24} {:>6}", row.name, row.count);
    }
    Ok(())
}

pub fn countries(config: &Config, output: Output) -> Result<()> {
    let db = open_database(config)?;
    let rows = Statistics::new(&db).country_counts()?;

    if output.json(&rows)? {
        return Ok(());
    }

    if rows.is_empty() {
        println!("No countries known yet. Run 'marquee enrich' to look them up.");
        return Ok(());
    }
    for row in &rows {
        println!("{:<40} {:>6}", row.name, row.count);
    }
    Ok(())
}

pub fn ratings(config: &Config, date: Option<&str>, output: Output) -> Result<()> {
    let db = open_database(config)?;
    let rows = Statistics::new(&db).ratings_by_snapshot(date)?;

    if output.json(&rows)? {
        return Ok(());
    }

    println!(
        "{:<11} {:<48} {:>5} {:>6} {:>10}",
        "Id", "Title", "Year", "Rating", "Votes"
    );
    for row in &rows {
        println!(
            "{:<11} {:<48} {:>5} {:>6} {:>10}",
            row.id,
            truncate(&row.title, 48),
            optional(row.year),
            optional(row.imdb_rating),
            optional(row.num_votes)
        );
    }
    println!("\n{} titles", rows.len());
    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}
