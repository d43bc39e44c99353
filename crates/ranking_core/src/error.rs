//! Error taxonomy shared by the generators, standings and the rating engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected input. Raised before any structure is produced, so callers never
/// see partial output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("at least 2 competitors are required, got {0}")]
    TooFewCompetitors(usize),
    #[error("competitor id {0:?} appears more than once")]
    DuplicateCompetitor(String),
    #[error("expected {expected} seeds, got {actual}")]
    SeedCountMismatch { expected: usize, actual: usize },
    #[error("seed number {0} is used more than once")]
    DuplicateSeedNumber(u32),
    #[error("seed number {seed} is outside 1..={max}")]
    SeedOutOfRange { seed: u32, max: usize },
    #[error("competitor {0:?} is seeded more than once")]
    DuplicateSeededCompetitor(String),
    #[error("seed refers to unknown competitor {0:?}")]
    UnknownSeededCompetitor(String),
    #[error("competitor {0:?} has no seed")]
    UnseededCompetitor(String),
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("score {0} is outside 0.0..=1.0")]
    ScoreOutOfRange(f64),
    #[error("{opponents} opponents but {scores} scores")]
    OpponentScoreMismatch { opponents: usize, scores: usize },
    #[error("invalid rating configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("round number {0} does not exist")]
    InvalidRoundNumber(u32),
    #[error("round {round}: {reason}")]
    RoundNotReady { round: u32, reason: String },
    #[error("unknown match {0:?}")]
    UnknownMatch(String),
    #[error("rank refers to unknown competitor {0:?}")]
    UnknownRankedCompetitor(String),
    #[error("malformed event: {0}")]
    MalformedEvent(String),
}

/// A rating computation produced a value that is not a finite number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("rating computation produced a non-finite {quantity}")]
pub struct NumericError {
    pub quantity: &'static str,
}

/// Error returned by the rating engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// Where the volatility solver ran out of iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverStage {
    Bracketing,
    Refinement,
}

/// The volatility solver hit its iteration cap before reaching tolerance.
/// Non-fatal: the best estimate so far is used.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize, Deserialize)]
#[error("volatility solver did not converge during {stage:?} after {iterations} iterations")]
pub struct ConvergenceWarning {
    pub stage: SolverStage,
    pub iterations: u32,
}

/// Failure reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);
