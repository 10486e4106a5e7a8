use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::evaluate::MatchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn default_path(&self) -> PathBuf {
        match self {
            ExportFormat::Json => PathBuf::from("picks_results.json"),
            ExportFormat::Csv => PathBuf::from("picks_results.csv"),
        }
    }
}

#[derive(Serialize)]
struct CsvResultRow {
    pick: String,
    best_match: usize,
    match_dates: String,
    exact_match: bool,
}

impl From<&MatchResult> for CsvResultRow {
    fn from(res: &MatchResult) -> Self {
        let pick = res.pick.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ");
        let dates = res
            .match_dates
            .iter()
            .map(|d| format!("'{}'", d))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            pick: format!("[{}]", pick),
            best_match: res.best_match,
            match_dates: format!("[{}]", dates),
            exact_match: res.exact_match,
        }
    }
}

pub fn export_results(results: &[MatchResult], format: ExportFormat, path: &Path) -> Result<()> {
    match format {
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(results)?;
            std::fs::write(path, json).with_context(|| format!("Cannot write {:?}", path))?;
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("Cannot write {:?}", path))?;
            for res in results {
                writer.serialize(CsvResultRow::from(res))?;
            }
            writer.flush()?;
        }
    }
    log::info!("{} results exported to {:?}", results.len(), path);
    Ok(())
}

/// Writes the game catalogue as a JSON array.
pub fn write_games(games: &[String], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(games)?;
    std::fs::write(path, json).with_context(|| format!("Cannot write {:?}", path))?;
    Ok(())
}
