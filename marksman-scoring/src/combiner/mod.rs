// marksman-scoring/src/combiner/mod.rs
//! Fuses keyword, semantic and structure sub-scores into a final grade.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::keywords::KeywordScoreMap;
use crate::policy::{LeniencyPolicy, ScoreWeights, ScoringPolicy};
use crate::round2;
use crate::signals::SimilaritySignals;

/// The three sub-scores, each on the [0, 100] scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub semantic: f64,
    pub keyword: f64,
    pub structure: f64,
}

/// Output of [`combine`]. All values are rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedScore {
    pub final_score: f64,
    pub semantic_score: f64,
    pub keyword_score: f64,
    pub structure_score: f64,
    pub final_percentage: f64,
}

/// Keyword score in [0, 100+]: redistributed mass plus a bonus for partially
/// matched keywords, relative to the original mass.
pub fn keyword_score(redistributed: &KeywordScoreMap, original: &KeywordScoreMap, policy: &ScoringPolicy) -> f64 {
    let possible = original.sum();
    if possible == 0.0 {
        return 0.0;
    }
    let (low, high) = policy.partial_band;
    let partial: f64 = redistributed
        .values()
        .filter(|v| (low..high).contains(v))
        .sum();
    (redistributed.sum() + policy.partial_bonus * partial) / possible * 100.0
}

impl SubScores {
    /// Computes the sub-scores before any leniency is applied.
    pub fn compute(
        signals: &SimilaritySignals,
        redistributed: &KeywordScoreMap,
        original: &KeywordScoreMap,
        policy: &ScoringPolicy,
    ) -> Self {
        Self {
            semantic: policy
                .semantic_blend
                .apply(signals.entity_similarity, signals.syntax_similarity),
            keyword: keyword_score(redistributed, original, policy),
            structure: policy
                .structure_blend
                .apply(signals.syntax_similarity, signals.sentiment_similarity),
        }
    }

    /// Raises keyword and semantic scores to the partial floor when either
    /// shows partial understanding.
    pub fn with_leniency_floor(self, leniency: &LeniencyPolicy) -> Self {
        if !leniency.enabled {
            return self;
        }
        if self.keyword > leniency.partial_trigger || self.semantic > leniency.partial_trigger {
            Self {
                semantic: self.semantic.max(leniency.partial_floor),
                keyword: self.keyword.max(leniency.partial_floor),
                ..self
            }
        } else {
            self
        }
    }

    /// Weighted sum of the sub-scores, before the final floor.
    pub fn weighted(&self, weights: &ScoreWeights) -> f64 {
        self.semantic * weights.semantic + self.keyword * weights.keyword + self.structure * weights.structure
    }
}

/// Applies the global floor to a final percentage.
pub fn with_final_floor(percentage: f64, leniency: &LeniencyPolicy) -> f64 {
    if leniency.enabled && percentage > leniency.final_trigger {
        percentage.max(leniency.final_floor)
    } else {
        percentage
    }
}

/// Turns already-computed sub-scores into a grade out of `max_marks`.
pub fn fuse(scores: SubScores, weights: &ScoreWeights, leniency: &LeniencyPolicy, max_marks: f64) -> CombinedScore {
    let floored = scores.with_leniency_floor(leniency);
    let percentage = with_final_floor(floored.weighted(weights), leniency);

    CombinedScore {
        final_score: round2(percentage / 100.0 * max_marks),
        semantic_score: round2(floored.semantic),
        keyword_score: round2(floored.keyword),
        structure_score: round2(floored.structure),
        final_percentage: round2(percentage),
    }
}

/// Combines the similarity signals and keyword maps into the final grade.
///
/// Fails when the signal bundle is malformed or the weights are invalid.
pub fn combine(
    signals: &SimilaritySignals,
    redistributed: &KeywordScoreMap,
    original: &KeywordScoreMap,
    max_marks: f64,
    weights: &ScoreWeights,
    policy: &ScoringPolicy,
) -> Result<CombinedScore, ScoringError> {
    signals.validate()?;
    weights.validate()?;

    let scores = SubScores::compute(signals, redistributed, original, policy);
    Ok(fuse(scores, weights, &policy.leniency, max_marks))
}
