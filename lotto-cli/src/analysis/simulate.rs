use rand::Rng;

use lotto_db::models::Draw;

use crate::analysis::evaluate::{check_picks_against_history, win_statistics, MatchResult, WinStats};
use crate::analysis::sampler::{generate_picks, Pick, PickParams, Strategy};
use crate::error::AnalysisError;

/// Picks of one strategy replayed against the history.
#[derive(Debug, Clone)]
pub struct StrategyReport {
    pub strategy: Strategy,
    pub results: Vec<MatchResult>,
    pub win_stats: WinStats,
}

impl StrategyReport {
    pub fn picks(&self) -> Vec<Pick> {
        self.results.iter().map(|r| r.pick.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct BestStrategy {
    pub strategy: Strategy,
    pub pick: Option<Pick>,
    pub win_stats: WinStats,
    pub score: u64,
}

pub fn run_strategy<R: Rng + ?Sized>(
    strategy: Strategy,
    draws: &[Draw],
    params: &PickParams,
    rng: &mut R,
) -> Result<StrategyReport, AnalysisError> {
    let picks = generate_picks(strategy, draws, params, rng)?;
    let results = check_picks_against_history(&picks, draws);
    let win_stats = win_statistics(&picks, draws);
    Ok(StrategyReport {
        strategy,
        results,
        win_stats,
    })
}

/// Runs every strategy. A strategy that cannot generate picks for this
/// history reports its error without stopping the others.
pub fn compare_strategies<R: Rng + ?Sized>(
    draws: &[Draw],
    params: &PickParams,
    rng: &mut R,
) -> Vec<(Strategy, Result<StrategyReport, AnalysisError>)> {
    Strategy::ALL
        .into_iter()
        .map(|strategy| (strategy, run_strategy(strategy, draws, params, &mut *rng)))
        .collect()
}

/// Strategy whose picks score highest over the history. Ties go to the
/// strategy listed first.
pub fn auto_best<R: Rng + ?Sized>(
    draws: &[Draw],
    params: &PickParams,
    rng: &mut R,
) -> Option<BestStrategy> {
    let mut best: Option<BestStrategy> = None;

    for (strategy, outcome) in compare_strategies(draws, params, rng) {
        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                log::warn!("Strategy {} skipped: {}", strategy, e);
                continue;
            }
        };
        let score = report.win_stats.score();
        log::debug!("Strategy {} scored {}", strategy, score);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(BestStrategy {
                strategy,
                pick: report.results.first().map(|r| r.pick.clone()),
                win_stats: report.win_stats,
                score,
            });
        }
    }

    best
}
