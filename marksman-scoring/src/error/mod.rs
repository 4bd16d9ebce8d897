// marksman-scoring/src/error/mod.rs
use thiserror::Error;

/// Internal invariant violations detected while computing a score.
///
/// These are treated as bugs in the caller's wiring, never as a reason to
/// fall back to a lenient default score.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("Similarity signal '{0}' is missing from the bundle")]
    MissingSignal(&'static str),

    #[error("Similarity signal '{field}' has invalid value {value} (expected a finite value in [0, 100])")]
    SignalOutOfRange { field: &'static str, value: f64 },

    #[error("Score weights sum to {0}, expected 1.0")]
    WeightsDoNotSumToOne(f64),

    #[error("Score weight '{field}' has invalid value {value} (expected a value in [0, 1])")]
    WeightOutOfRange { field: &'static str, value: f64 },
}
