use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use lotto_db::models::Draw;

use crate::analysis::sampler::Pick;

/// Best historical overlap of one pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub pick: Pick,
    pub best_match: usize,
    /// Dates reaching `best_match`, in draw order.
    pub match_dates: Vec<String>,
    pub exact_match: bool,
}

fn number_set(numbers: &[u8]) -> BTreeSet<u8> {
    numbers.iter().copied().collect()
}

/// Scores every pick against the whole history.
///
/// A draw whose overlap equals the current best is recorded as a tie, which
/// includes zero-overlap draws while nothing better has been seen.
pub fn check_picks_against_history(picks: &[Pick], draws: &[Draw]) -> Vec<MatchResult> {
    let draw_sets: Vec<BTreeSet<u8>> = draws.iter().map(|d| number_set(&d.numbers)).collect();

    picks
        .iter()
        .map(|pick| {
            let pick_set = number_set(pick);
            let mut best_match = 0;
            let mut match_dates = Vec::new();
            let mut exact_match = false;

            for (draw, draw_set) in draws.iter().zip(&draw_sets) {
                let overlap = pick_set.intersection(draw_set).count();
                if overlap > best_match {
                    best_match = overlap;
                    match_dates = vec![draw.date.to_string()];
                } else if overlap == best_match {
                    match_dates.push(draw.date.to_string());
                }
                if pick_set == *draw_set {
                    exact_match = true;
                }
            }

            MatchResult {
                pick: pick.clone(),
                best_match,
                match_dates,
                exact_match,
            }
        })
        .collect()
}

/// Counts of 3, 4, 5 and 6-number matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinStats {
    counts: BTreeMap<usize, u32>,
}

impl Default for WinStats {
    fn default() -> Self {
        Self::new()
    }
}

impl WinStats {
    pub const TIERS: [usize; 4] = [6, 5, 4, 3];

    pub fn new() -> Self {
        Self {
            counts: Self::TIERS.iter().map(|&t| (t, 0)).collect(),
        }
    }

    /// Counts `matches` if it is one of the tracked tiers.
    pub fn record(&mut self, matches: usize) {
        if let Some(count) = self.counts.get_mut(&matches) {
            *count += 1;
        }
    }

    pub fn get(&self, tier: usize) -> u32 {
        self.counts.get(&tier).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Ranks a tally: one 6 outweighs any realistic number of lower tiers.
    pub fn score(&self) -> u64 {
        self.get(6) as u64 * 10_000 + self.get(5) as u64 * 100 + self.get(4) as u64 * 10 + self.get(3) as u64
    }

    /// Hits of `tier` per historical draw.
    pub fn per_draw_rate(&self, tier: usize, total_draws: usize) -> f64 {
        if total_draws == 0 {
            return 0.0;
        }
        self.get(tier) as f64 / total_draws as f64
    }

    /// Tally of each line's best match.
    pub fn from_best_matches(results: &[MatchResult]) -> Self {
        let mut stats = Self::new();
        for res in results {
            stats.record(res.best_match);
        }
        stats
    }
}

/// Tallies the overlap of every (pick, draw) pair.
pub fn win_statistics(picks: &[Pick], draws: &[Draw]) -> WinStats {
    let pick_sets: Vec<BTreeSet<u8>> = picks.iter().map(|p| number_set(p)).collect();
    let mut stats = WinStats::new();
    for draw in draws {
        let draw_set = number_set(&draw.numbers);
        for pick_set in &pick_sets {
            stats.record(pick_set.intersection(&draw_set).count());
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::make_test_draws;

    #[test]
    fn test_exact_match() {
        let draws = vec![Draw::new("2020-01-01", &[1, 2, 3, 4, 5, 6])];
        let results = check_picks_against_history(&[vec![1, 2, 3, 4, 5, 6]], &draws);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].best_match, 6);
        assert_eq!(results[0].match_dates, vec!["2020-01-01"]);
        assert!(results[0].exact_match);
    }

    #[test]
    fn test_exact_match_ignores_draw_order() {
        let draws = vec![Draw::new("2020-01-01", &[6, 5, 4, 3, 2, 1])];
        let results = check_picks_against_history(&[vec![1, 2, 3, 4, 5, 6]], &draws);
        assert!(results[0].exact_match);
    }

    #[test]
    fn test_best_match_end_to_end() {
        let draws = vec![
            Draw::new("2021-01-01", &[1, 2, 3, 4, 5, 6]),
            Draw::new("2021-01-08", &[7, 8, 9, 10, 11, 12]),
        ];
        let results = check_picks_against_history(&[vec![1, 2, 3, 4, 5, 7]], &draws);

        assert_eq!(results[0].pick, vec![1, 2, 3, 4, 5, 7]);
        assert_eq!(results[0].best_match, 5);
        assert_eq!(results[0].match_dates, vec!["2021-01-01"]);
        assert!(!results[0].exact_match);
    }

    #[test]
    fn test_four_number_best_match() {
        let draws = vec![
            Draw::new("2021-01-01", &[1, 2, 3, 4, 20, 21]),
            Draw::new("2021-01-08", &[7, 8, 9, 10, 11, 12]),
        ];
        let results = check_picks_against_history(&[vec![1, 2, 3, 4, 5, 6]], &draws);

        assert_eq!(results[0].best_match, 4);
        assert_eq!(results[0].match_dates, vec!["2021-01-01"]);
        assert!(!results[0].exact_match);
    }

    #[test]
    fn test_ties_kept_in_draw_order() {
        let draws = vec![
            Draw::new("2021-03-01", &[1, 2, 30, 31, 32, 33]),
            Draw::new("2021-01-01", &[40, 41, 42, 43, 44, 45]),
            Draw::new("2021-02-01", &[5, 6, 34, 35, 36, 37]),
        ];
        let results = check_picks_against_history(&[vec![1, 2, 3, 4, 5, 6]], &draws);

        assert_eq!(results[0].best_match, 2);
        assert_eq!(results[0].match_dates, vec!["2021-03-01", "2021-02-01"]);
    }

    #[test]
    fn test_zero_overlap_draws_are_ties_until_beaten() {
        let draws = vec![
            Draw::new("2021-01-01", &[40, 41, 42, 43, 44, 45]),
            Draw::new("2021-01-08", &[46, 47, 48, 49, 50, 51]),
        ];
        let results = check_picks_against_history(&[vec![1, 2, 3, 4, 5, 6]], &draws);
        assert_eq!(results[0].best_match, 0);
        assert_eq!(results[0].match_dates, vec!["2021-01-01", "2021-01-08"]);

        let mut draws = draws;
        draws.push(Draw::new("2021-01-15", &[1, 50, 51, 52, 53, 54]));
        let results = check_picks_against_history(&[vec![1, 2, 3, 4, 5, 6]], &draws);
        assert_eq!(results[0].best_match, 1);
        assert_eq!(results[0].match_dates, vec!["2021-01-15"]);
    }

    #[test]
    fn test_raw_dates_reported_verbatim() {
        let draws = vec![Draw::new("week 12", &[1, 2, 3, 4, 5, 6])];
        let results = check_picks_against_history(&[vec![1, 2, 3]], &draws);
        assert_eq!(results[0].match_dates, vec!["week 12"]);
    }

    #[test]
    fn test_evaluation_is_pure() {
        let draws = make_test_draws(60);
        let picks = vec![vec![1, 2, 3, 4, 5, 6], vec![10, 20, 30, 40, 50, 55], vec![7, 8, 9]];
        let first = check_picks_against_history(&picks, &draws);
        let second = check_picks_against_history(&picks, &draws);
        assert_eq!(first, second);
        assert_eq!(first.len(), picks.len());
        for (res, pick) in first.iter().zip(&picks) {
            assert_eq!(&res.pick, pick);
        }
    }

    #[test]
    fn test_empty_history() {
        let results = check_picks_against_history(&[vec![1, 2, 3, 4, 5, 6]], &[]);
        assert_eq!(results[0].best_match, 0);
        assert!(results[0].match_dates.is_empty());
        assert!(!results[0].exact_match);
    }

    #[test]
    fn test_win_statistics_counts_every_pair() {
        let draws = vec![
            Draw::new("2021-01-01", &[1, 2, 3, 4, 5, 6]),
            Draw::new("2021-01-08", &[1, 2, 3, 10, 11, 12]),
            Draw::new("2021-01-15", &[1, 2, 3, 4, 11, 12]),
        ];
        let picks = vec![vec![1, 2, 3, 4, 5, 6], vec![1, 2, 3, 4, 5, 7]];
        let stats = win_statistics(&picks, &draws);

        // pick 1: 6, 3, 4 ; pick 2: 5, 3, 4
        assert_eq!(stats.get(6), 1);
        assert_eq!(stats.get(5), 1);
        assert_eq!(stats.get(4), 2);
        assert_eq!(stats.get(3), 2);
        assert_eq!(stats.total(), 6);
    }

    #[test]
    fn test_win_stats_ignores_untracked_tiers() {
        let mut stats = WinStats::new();
        stats.record(0);
        stats.record(2);
        stats.record(7);
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.get(2), 0);
    }

    #[test]
    fn test_win_stats_score_ordering() {
        let mut one_six = WinStats::new();
        one_six.record(6);
        let mut many_threes = WinStats::new();
        for _ in 0..99 {
            many_threes.record(3);
        }
        assert_eq!(one_six.score(), 10_000);
        assert_eq!(many_threes.score(), 99);
        assert!(one_six.score() > many_threes.score());
    }

    #[test]
    fn test_default_tracks_every_tier() {
        let mut stats = WinStats::default();
        stats.record(3);
        stats.record(6);
        assert_eq!(stats.total(), 2);
        assert_eq!(stats, {
            let mut expected = WinStats::new();
            expected.record(3);
            expected.record(6);
            expected
        });
    }

    #[test]
    fn test_per_draw_rate() {
        let mut stats = WinStats::new();
        stats.record(3);
        stats.record(3);
        assert!((stats.per_draw_rate(3, 8) - 0.25).abs() < 1e-12);
        assert_eq!(stats.per_draw_rate(3, 0), 0.0);
    }

    #[test]
    fn test_from_best_matches() {
        let draws = vec![
            Draw::new("2021-01-01", &[1, 2, 3, 4, 5, 6]),
            Draw::new("2021-01-08", &[1, 2, 3, 10, 11, 12]),
        ];
        let picks = vec![vec![1, 2, 3, 4, 5, 6], vec![1, 2, 3, 20, 21, 22], vec![40, 41, 42, 43, 44, 45]];
        let results = check_picks_against_history(&picks, &draws);
        let stats = WinStats::from_best_matches(&results);
        assert_eq!(stats.get(6), 1);
        assert_eq!(stats.get(3), 1);
        assert_eq!(stats.total(), 2);
    }
}
