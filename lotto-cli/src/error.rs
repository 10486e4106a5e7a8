use thiserror::Error;

/// Errors raised by the pick generator and the evaluator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Unknown strategy: {0} (expected top, cold, hot, random or hybrid)")]
    InvalidStrategy(String),

    #[error("Pool too small: {requested} numbers requested, {available} available")]
    InsufficientPool { requested: usize, available: usize },

    #[error("No draws found for game: {0}")]
    EmptyHistory(String),
}
