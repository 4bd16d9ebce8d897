// marksman-scoring/src/lib.rs
//! Pure scoring algorithms for marksman.
//!
//! Every function in this crate is synchronous and free of I/O: the inputs are
//! the raw measurements produced by a language-analysis service, the outputs
//! are keyword score maps, similarity signals and fused grades.

pub mod error;
pub mod keywords;
pub mod similarity;
pub mod matcher;
pub mod redistribution;
pub mod signals;
pub mod relevance;
pub mod combiner;
pub mod policy;

pub use error::ScoringError;
pub use keywords::{EntityType, KeywordEntry, KeywordIndex, KeywordScoreMap};
pub use matcher::{match_keywords, MatchOutcome};
pub use redistribution::redistribute;
pub use signals::{derive_signals, PartialSignals, SimilaritySignals, TextAnalysis};
pub use relevance::{RelevanceGate, GateDecision};
pub use combiner::{combine, fuse, CombinedScore, SubScores};
pub use policy::{Blend, LeniencyPolicy, RedistributionMode, ScoreWeights, ScoringPolicy};

/// Rounds to two decimal places, the precision of every reported score.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
