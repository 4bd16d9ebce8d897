// marksman-scoring/src/policy/mod.rs
//! Tunable grading policy.
//!
//! Every constant used by the scoring pipeline lives here so that policy
//! variants (the lenient default, the stricter legacy weighting, and so on)
//! are configuration rather than code.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// Tolerance used when checking that the three weights sum to 1.0.
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Relative weight of each sub-score in the final percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub semantic: f64,
    pub keyword: f64,
    pub structure: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            semantic: 0.35,
            keyword: 0.40,
            structure: 0.25,
        }
    }
}

impl ScoreWeights {
    pub fn new(semantic: f64, keyword: f64, structure: f64) -> Self {
        Self { semantic, keyword, structure }
    }

    pub fn sum(&self) -> f64 {
        self.semantic + self.keyword + self.structure
    }

    /// Each weight must be in [0, 1] and together they must sum to 1.0.
    pub fn validate(&self) -> Result<(), ScoringError> {
        for (field, value) in [
            ("semantic", self.semantic),
            ("keyword", self.keyword),
            ("structure", self.structure),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ScoringError::WeightOutOfRange { field, value });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ScoringError::WeightsDoNotSumToOne(sum));
        }
        Ok(())
    }
}

/// How mass from missing keywords is handed to matched keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedistributionMode {
    /// Flat per-keyword bonus: `missing_mass / recipients`.
    #[default]
    Even,
    /// Bonus proportional to each recipient's share of the total mass.
    Proportional,
}

/// Two-way blend of percentage signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blend {
    pub primary: f64,
    pub secondary: f64,
}

impl Blend {
    pub const fn new(primary: f64, secondary: f64) -> Self {
        Self { primary, secondary }
    }

    pub fn apply(&self, primary: f64, secondary: f64) -> f64 {
        primary * self.primary + secondary * self.secondary
    }
}

/// Floors that keep partially correct answers from being graded harshly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeniencyPolicy {
    pub enabled: bool,
    /// Keyword or semantic score above which partial understanding is assumed.
    pub partial_trigger: f64,
    /// Minimum for both keyword and semantic score once triggered.
    pub partial_floor: f64,
    /// Final percentage above which the final floor applies.
    pub final_trigger: f64,
    pub final_floor: f64,
}

impl Default for LeniencyPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            partial_trigger: 30.0,
            partial_floor: 25.0,
            final_trigger: 20.0,
            final_floor: 25.0,
        }
    }
}

impl LeniencyPolicy {
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }
}

/// The full set of scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub weights: ScoreWeights,
    /// Minimum relevance, on the [0, 100] scale, for an answer to be graded.
    pub relevance_threshold: f64,
    /// Fuzzy candidates must have a similarity strictly above this value.
    pub keyword_match_threshold: f64,
    /// Similarity granted when one keyword contains the other.
    pub containment_similarity: f64,
    /// Multiplier for exact matches whose entity types agree.
    pub type_bonus: f64,
    pub mention_ratio_cap: f64,
    /// Keywords scoring below this value are treated as unmatched.
    pub missing_threshold: f64,
    pub redistribution: RedistributionMode,
    /// Half-open band `[low, high)` of partially matched keyword scores.
    pub partial_band: (f64, f64),
    /// Extra credit, as a fraction of the partial-band mass.
    pub partial_bonus: f64,
    /// Entity similarity (primary) and syntax similarity (secondary).
    pub semantic_blend: Blend,
    /// Syntax similarity (primary) and sentiment similarity (secondary).
    pub structure_blend: Blend,
    pub leniency: LeniencyPolicy,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            relevance_threshold: 10.0,
            keyword_match_threshold: 0.80,
            containment_similarity: 0.85,
            type_bonus: 1.1,
            mention_ratio_cap: 1.5,
            missing_threshold: 0.1,
            redistribution: RedistributionMode::Even,
            partial_band: (0.1, 0.8),
            partial_bonus: 0.2,
            semantic_blend: Blend::new(0.7, 0.3),
            structure_blend: Blend::new(0.6, 0.4),
            leniency: LeniencyPolicy::default(),
        }
    }
}

impl ScoringPolicy {
    /// Checks that the weights are well formed.
    pub fn validate(&self) -> Result<(), ScoringError> {
        self.weights.validate()
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }
}
