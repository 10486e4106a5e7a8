use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use lotto_db::models::{Draw, GameFormat};

use crate::analysis::{count_number_frequency, FrequencyTable};
use crate::error::AnalysisError;

/// A sorted line of distinct numbers.
pub type Pick = Vec<u8>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Strategy {
    /// Most frequent numbers over the whole history
    #[default]
    Top,
    /// Least frequent numbers over the whole history
    Cold,
    /// Most frequent numbers over the last draws
    Hot,
    /// Any number of the game
    Random,
    /// Half from the top numbers, half from the whole game
    Hybrid,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Top,
        Strategy::Cold,
        Strategy::Hot,
        Strategy::Random,
        Strategy::Hybrid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Top => "top",
            Strategy::Cold => "cold",
            Strategy::Hot => "hot",
            Strategy::Random => "random",
            Strategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Strategy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == wanted)
            .ok_or_else(|| AnalysisError::InvalidStrategy(s.to_string()))
    }
}

impl TryFrom<String> for Strategy {
    type Error = AnalysisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickParams {
    pub n_picks: usize,
    pub top_n: usize,
    pub hot_x: usize,
    pub format: GameFormat,
}

impl Default for PickParams {
    fn default() -> Self {
        Self {
            n_picks: 5,
            top_n: 10,
            hot_x: 20,
            format: GameFormat::default(),
        }
    }
}

/// Seeded generator when `seed` is given, entropy-seeded otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Draws `count` distinct elements of `pool`, without replacement.
pub fn sample_numbers<R: Rng + ?Sized>(
    pool: &[u8],
    count: usize,
    rng: &mut R,
) -> Result<Vec<u8>, AnalysisError> {
    if count > pool.len() {
        return Err(AnalysisError::InsufficientPool {
            requested: count,
            available: pool.len(),
        });
    }
    Ok(pool.choose_multiple(rng, count).copied().collect())
}

fn most_frequent(freq: &FrequencyTable, n: usize) -> Result<Vec<u8>, AnalysisError> {
    let ranked = freq.most_common();
    if n > ranked.len() {
        return Err(AnalysisError::InsufficientPool {
            requested: n,
            available: ranked.len(),
        });
    }
    Ok(ranked.iter().take(n).map(|&(num, _)| num).collect())
}

fn least_frequent(freq: &FrequencyTable, n: usize) -> Result<Vec<u8>, AnalysisError> {
    let ranked = freq.most_common();
    if n > ranked.len() {
        return Err(AnalysisError::InsufficientPool {
            requested: n,
            available: ranked.len(),
        });
    }
    Ok(ranked[ranked.len() - n..].iter().map(|&(num, _)| num).collect())
}

/// Candidate numbers a strategy samples from. For `Hybrid` this is the
/// frequency half of the pick; the other half comes from the whole game.
pub fn strategy_pool(
    strategy: Strategy,
    draws: &[Draw],
    params: &PickParams,
) -> Result<Vec<u8>, AnalysisError> {
    match strategy {
        Strategy::Top | Strategy::Hybrid => most_frequent(&count_number_frequency(draws), params.top_n),
        Strategy::Cold => least_frequent(&count_number_frequency(draws), params.top_n),
        Strategy::Hot => {
            let recent = &draws[draws.len().saturating_sub(params.hot_x)..];
            most_frequent(&count_number_frequency(recent), params.top_n)
        }
        Strategy::Random => Ok(params.format.domain()),
    }
}

/// Generates `params.n_picks` independent picks. Picks may repeat across
/// lines. Hybrid picks are the union of both halves and can come out short
/// when the halves overlap.
pub fn generate_picks<R: Rng + ?Sized>(
    strategy: Strategy,
    draws: &[Draw],
    params: &PickParams,
    rng: &mut R,
) -> Result<Vec<Pick>, AnalysisError> {
    let pick_size = params.format.pick_size;
    let pool = strategy_pool(strategy, draws, params)?;

    let mut picks = Vec::with_capacity(params.n_picks);
    match strategy {
        Strategy::Top | Strategy::Cold | Strategy::Hot | Strategy::Random => {
            for _ in 0..params.n_picks {
                let mut pick = sample_numbers(&pool, pick_size, rng)?;
                pick.sort();
                picks.push(pick);
            }
        }
        Strategy::Hybrid => {
            let domain = params.format.domain();
            let from_top = pick_size / 2;
            let from_domain = pick_size - from_top;
            for _ in 0..params.n_picks {
                let mut pick: BTreeSet<u8> = sample_numbers(&pool, from_top, rng)?.into_iter().collect();
                pick.extend(sample_numbers(&domain, from_domain, rng)?);
                picks.push(pick.into_iter().collect());
            }
        }
    }

    Ok(picks)
}
