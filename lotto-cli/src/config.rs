use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use lotto_db::models::{GameFormat, DEFAULT_GAME};

use crate::analysis::sampler::{PickParams, Strategy};

/// Settings read from an optional JSON file. Missing fields take defaults;
/// command-line flags override both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub game: String,
    pub strategy: Strategy,
    pub n_picks: usize,
    pub top_n: usize,
    pub hot_x: usize,
    /// Used when the game name carries no `<pick>-<pool>` suffix.
    pub pick_size: usize,
    pub pool_size: u8,
    pub csv_path: PathBuf,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let format = GameFormat::default();
        Self {
            game: DEFAULT_GAME.to_string(),
            strategy: Strategy::Top,
            n_picks: 5,
            top_n: 10,
            hot_x: 20,
            pick_size: format.pick_size,
            pool_size: format.pool_size,
            csv_path: PathBuf::from("data").join("lotto_history.csv"),
        }
    }
}

impl AnalyzerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {:?}", path))?;
        let config: AnalyzerConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid JSON in {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// File values when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_picks == 0 {
            bail!("n_picks must be at least 1");
        }
        if self.top_n == 0 {
            bail!("top_n must be at least 1");
        }
        if self.hot_x == 0 {
            bail!("hot_x must be at least 1");
        }
        if self.pick_size == 0 || self.pick_size > self.pool_size as usize {
            bail!(
                "pick_size {} does not fit a pool of {}",
                self.pick_size,
                self.pool_size
            );
        }
        Ok(())
    }

    /// Format of the configured game, from its name when possible.
    pub fn game_format(&self) -> GameFormat {
        GameFormat::from_game_name(&self.game).unwrap_or(GameFormat {
            pick_size: self.pick_size,
            pool_size: self.pool_size,
        })
    }

    pub fn pick_params(&self) -> PickParams {
        PickParams {
            n_picks: self.n_picks,
            top_n: self.top_n,
            hot_x: self.hot_x,
            format: self.game_format(),
        }
    }
}
