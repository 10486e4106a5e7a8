use std::fmt;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

/// Accepted draw date layouts, tried in order.
pub const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y", "%Y-%d-%m"];

pub const DEFAULT_GAME: &str = "GRAND_LOTTO_6-55";

/// A draw date. Dates that match none of [`DATE_FORMATS`] are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawDate {
    Parsed(NaiveDate),
    Raw(String),
}

impl DrawDate {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
            .map(DrawDate::Parsed)
            .unwrap_or_else(|| DrawDate::Raw(trimmed.to_string()))
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, DrawDate::Parsed(_))
    }
}

impl fmt::Display for DrawDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawDate::Parsed(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DrawDate::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Draw {
    pub id: i64,
    pub game: String,
    pub date: DrawDate,
    pub numbers: Vec<u8>,
}

impl Draw {
    /// Unsaved draw (id 0) for the default game.
    pub fn new(date: &str, numbers: &[u8]) -> Self {
        Self {
            id: 0,
            game: DEFAULT_GAME.to_string(),
            date: DrawDate::parse(date),
            numbers: numbers.to_vec(),
        }
    }
}

/// How many numbers a line holds and how large the number pool is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameFormat {
    pub pick_size: usize,
    pub pool_size: u8,
}

impl Default for GameFormat {
    fn default() -> Self {
        Self {
            pick_size: 6,
            pool_size: 55,
        }
    }
}

impl GameFormat {
    /// Reads the `<pick>-<pool>` suffix of names like `GRAND_LOTTO_6-55`.
    pub fn from_game_name(name: &str) -> Option<Self> {
        let suffix = name.rsplit('_').next()?;
        let (pick, pool) = suffix.split_once('-')?;
        let pick_size: usize = pick.trim().parse().ok()?;
        let pool_size: u8 = pool.trim().parse().ok()?;
        if pick_size == 0 || pick_size > pool_size as usize {
            return None;
        }
        Some(Self {
            pick_size,
            pool_size,
        })
    }

    pub fn domain(&self) -> Vec<u8> {
        (1..=self.pool_size).collect()
    }

    pub fn contains(&self, n: u8) -> bool {
        n >= 1 && n <= self.pool_size
    }
}

/// Parses a list-like literal such as `[1, 2, 3]` or `(1, 2, 3)`.
/// A lone integer becomes a one-element list.
pub fn parse_combinations(raw: &str) -> Result<Vec<u8>> {
    let trimmed = raw.trim();
    let inner = match (trimmed.chars().next(), trimmed.chars().last()) {
        (Some('['), Some(']')) | (Some('('), Some(')')) if trimmed.len() >= 2 => {
            &trimmed[1..trimmed.len() - 1]
        }
        _ => trimmed,
    };

    if trimmed.is_empty() {
        bail!("Empty combination");
    }

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let mut numbers = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        // Python-style trailing comma: "[1, 2,]"
        if part.is_empty() && i == parts.len() - 1 && i > 0 {
            continue;
        }
        if part.is_empty() && parts.len() == 1 {
            continue;
        }
        let n = part
            .parse::<u8>()
            .with_context(|| format!("Invalid number '{}' in '{}'", part, raw))?;
        numbers.push(n);
    }
    Ok(numbers)
}

/// Checks a user-supplied line against the game format.
pub fn validate_pick(numbers: &[u8], format: GameFormat) -> Result<()> {
    if numbers.len() != format.pick_size {
        bail!(
            "Expected {} numbers, got {}",
            format.pick_size,
            numbers.len()
        );
    }
    for &n in numbers {
        if !format.contains(n) {
            bail!("Number {} out of range (1-{})", n, format.pool_size);
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Duplicate number: {}", numbers[i]);
            }
        }
    }
    Ok(())
}
