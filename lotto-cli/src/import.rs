use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use lotto_db::db::{upsert_draw, UpsertOutcome};
use lotto_db::models::{parse_combinations, Draw, DrawDate};
use lotto_db::rusqlite::Connection;

#[derive(Debug, Deserialize)]
struct CsvRow {
    game: String,
    #[serde(rename = "drawDate")]
    draw_date: String,
    combinations: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub total_records: u32,
    pub inserted: u32,
    pub updated: u32,
    pub unchanged: u32,
    /// Malformed rows, left out of the history.
    pub skipped: u32,
    /// Rows whose date matched no known layout and was kept as text.
    pub raw_dates: u32,
}

fn parse_row(row: CsvRow) -> Result<Draw> {
    let numbers = parse_combinations(&row.combinations)
        .with_context(|| format!("Bad combination for {} on {}", row.game, row.draw_date))?;
    Ok(Draw {
        id: 0,
        game: row.game.trim().to_string(),
        date: DrawDate::parse(&row.draw_date),
        numbers,
    })
}

/// Parses draw history from CSV with `game`, `drawDate` and `combinations`
/// columns. Returns the draws in file order and the number of rows skipped.
pub fn read_draws<R: Read>(input: R) -> (Vec<Draw>, u32) {
    let mut reader = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::Headers).from_reader(input);

    let mut draws = Vec::new();
    let mut skipped = 0;

    for (line, record) in reader.deserialize::<CsvRow>().enumerate() {
        let parsed = record
            .map_err(anyhow::Error::from)
            .and_then(parse_row);
        match parsed {
            Ok(draw) => draws.push(draw),
            Err(e) => {
                log::debug!("Skipping row {}: {:#}", line + 1, e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        log::warn!("{} malformed rows skipped", skipped);
    }
    (draws, skipped)
}

/// Loads a CSV export into the store, updating draws already present.
pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportSummary> {
    let file = std::fs::File::open(path).with_context(|| format!("Cannot open {:?}", path))?;
    let (draws, skipped) = read_draws(file);

    let pb = ProgressBar::new(draws.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows")?
            .progress_chars("=> "),
    );

    let tx = conn
        .unchecked_transaction()
        .context("Cannot start transaction")?;

    let mut summary = ImportSummary {
        total_records: draws.len() as u32 + skipped,
        skipped,
        ..ImportSummary::default()
    };

    // Rows already seen per (game, date) in this file
    let mut seen: HashMap<(String, String), usize> = HashMap::new();

    for draw in &draws {
        if !draw.date.is_parsed() {
            summary.raw_dates += 1;
        }
        let occurrence = seen
            .entry((draw.game.clone(), draw.date.to_string()))
            .or_insert(0);
        let outcome = upsert_draw(&tx, draw, *occurrence)?;
        *occurrence += 1;
        match outcome {
            UpsertOutcome::Inserted => summary.inserted += 1,
            UpsertOutcome::Updated => summary.updated += 1,
            UpsertOutcome::Unchanged => summary.unchanged += 1,
        }
        pb.inc(1);
    }

    tx.commit().context("Commit failed")?;
    pb.finish_and_clear();

    log::info!(
        "Imported {:?}: {} inserted, {} updated, {} unchanged, {} skipped",
        path,
        summary.inserted,
        summary.updated,
        summary.unchanged,
        summary.skipped
    );
    Ok(summary)
}
