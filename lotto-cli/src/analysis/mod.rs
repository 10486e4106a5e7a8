pub mod evaluate;
pub mod play;
pub mod sampler;
pub mod simulate;

use std::collections::HashMap;

use lotto_db::models::Draw;

use crate::error::AnalysisError;

/// Draw counts per number. Numbers that never appeared count as 0.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts: HashMap<u8, u32>,
    first_seen: Vec<u8>,
}

impl FrequencyTable {
    pub fn count(&self, number: u8) -> u32 {
        self.counts.get(&number).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Number of distinct numbers observed.
    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }

    /// Observed numbers by descending count. Equal counts keep the order in
    /// which the numbers were first seen.
    pub fn most_common(&self) -> Vec<(u8, u32)> {
        let mut ranked: Vec<(u8, u32)> = self
            .first_seen
            .iter()
            .map(|&n| (n, self.count(n)))
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    fn record(&mut self, number: u8) {
        let entry = self.counts.entry(number).or_insert(0);
        if *entry == 0 {
            self.first_seen.push(number);
        }
        *entry += 1;
    }
}

pub fn count_number_frequency(draws: &[Draw]) -> FrequencyTable {
    let mut freq = FrequencyTable::default();
    for draw in draws {
        for &n in &draw.numbers {
            freq.record(n);
        }
    }
    freq
}

/// Fails with `EmptyHistory` when the game has no stored draws.
pub fn ensure_history(draws: &[Draw], game: &str) -> Result<(), AnalysisError> {
    if draws.is_empty() {
        return Err(AnalysisError::EmptyHistory(game.to_string()));
    }
    Ok(())
}

/// Symmetric matrix of how often two numbers were drawn together.
/// `matrix[a - 1][b - 1]`; numbers outside 1..=pool_size are ignored.
pub fn co_occurrence(draws: &[Draw], pool_size: u8) -> Vec<Vec<u32>> {
    let size = pool_size as usize;
    let mut matrix = vec![vec![0u32; size]; size];

    for draw in draws {
        let nums = &draw.numbers;
        for i in 0..nums.len() {
            for j in (i + 1)..nums.len() {
                let (a, b) = (nums[i] as usize, nums[j] as usize);
                if a == 0 || b == 0 || a > size || b > size {
                    continue;
                }
                matrix[a - 1][b - 1] += 1;
                matrix[b - 1][a - 1] += 1;
            }
        }
    }

    matrix
}

/// Most frequent pairs `(a, b, count)` with `a < b`, highest count first.
pub fn top_pairs(matrix: &[Vec<u32>], limit: usize) -> Vec<(u8, u8, u32)> {
    let mut pairs = Vec::new();
    for (i, row) in matrix.iter().enumerate() {
        for (j, &count) in row.iter().enumerate().skip(i + 1) {
            if count > 0 {
                pairs.push(((i + 1) as u8, (j + 1) as u8, count));
            }
        }
    }
    pairs.sort_by(|a, b| b.2.cmp(&a.2));
    pairs.truncate(limit);
    pairs
}

/// Deterministic history over 1..=55: draw `i` holds six consecutive
/// numbers starting at `(i * 7) % 50 + 1`.
#[cfg(test)]
pub(crate) fn make_test_draws(n: usize) -> Vec<Draw> {
    (0..n)
        .map(|i| {
            let base = ((i * 7) % 50) as u8;
            let numbers: Vec<u8> = (1..=6).map(|k| base + k).collect();
            let mut draw = Draw::new(&format!("2024-01-{:02}", (i % 28) + 1), &numbers);
            draw.id = i as i64 + 1;
            draw
        })
        .collect()
}
