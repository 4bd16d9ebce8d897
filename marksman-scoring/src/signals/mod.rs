// marksman-scoring/src/signals/mod.rs
//! Derivation of the similarity signal bundle from raw analyzer output.
//!
//! All percentages are on the [0, 100] scale.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::keywords::KeywordEntry;
use crate::policy::ScoringPolicy;
use crate::relevance::RelevanceGate;
use crate::similarity::{keyword_similarity, sequence_ratio, word_overlap};

/// Raw language-analysis output for one text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    #[serde(default)]
    pub entities: Vec<KeywordEntry>,
    /// Document sentiment in [-1, 1].
    #[serde(default)]
    pub sentiment: f64,
    /// Part-of-speech tag per token, in order.
    #[serde(default)]
    pub syntax: Vec<String>,
}

/// The bundle of similarity measurements consumed by the combiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilaritySignals {
    pub entity_similarity: f64,
    pub syntax_similarity: f64,
    pub sentiment_similarity: f64,
    pub relevance_score: f64,
    pub is_relevant: bool,
    /// Feedback only, never used in the numeric formula.
    #[serde(default)]
    pub common_entities: Vec<String>,
    #[serde(default)]
    pub missing_entities: Vec<String>,
}

impl SimilaritySignals {
    /// Signals for an answer rejected by the relevance gate.
    pub fn irrelevant(relevance_score: f64, missing_entities: Vec<String>) -> Self {
        Self {
            entity_similarity: 0.0,
            syntax_similarity: 0.0,
            sentiment_similarity: 0.0,
            relevance_score,
            is_relevant: false,
            common_entities: Vec::new(),
            missing_entities,
        }
    }

    /// Rejects non-finite values and values outside [0, 100].
    pub fn validate(&self) -> Result<(), ScoringError> {
        for (field, value) in [
            ("entity_similarity", self.entity_similarity),
            ("syntax_similarity", self.syntax_similarity),
            ("sentiment_similarity", self.sentiment_similarity),
            ("relevance_score", self.relevance_score),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ScoringError::SignalOutOfRange { field, value });
            }
        }
        Ok(())
    }
}

/// A signal bundle as received over the wire, where any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialSignals {
    pub entity_similarity: Option<f64>,
    pub syntax_similarity: Option<f64>,
    pub sentiment_similarity: Option<f64>,
    pub relevance_score: Option<f64>,
    pub is_relevant: Option<bool>,
    #[serde(default)]
    pub common_entities: Vec<String>,
    #[serde(default)]
    pub missing_entities: Vec<String>,
}

impl TryFrom<PartialSignals> for SimilaritySignals {
    type Error = ScoringError;

    fn try_from(partial: PartialSignals) -> Result<Self, Self::Error> {
        let signals = SimilaritySignals {
            entity_similarity: partial
                .entity_similarity
                .ok_or(ScoringError::MissingSignal("entity_similarity"))?,
            syntax_similarity: partial
                .syntax_similarity
                .ok_or(ScoringError::MissingSignal("syntax_similarity"))?,
            sentiment_similarity: partial
                .sentiment_similarity
                .ok_or(ScoringError::MissingSignal("sentiment_similarity"))?,
            relevance_score: partial
                .relevance_score
                .ok_or(ScoringError::MissingSignal("relevance_score"))?,
            is_relevant: partial.is_relevant.ok_or(ScoringError::MissingSignal("is_relevant"))?,
            common_entities: partial.common_entities,
            missing_entities: partial.missing_entities,
        };
        signals.validate()?;
        Ok(signals)
    }
}

/// Which reference entities the student covered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityOverlap {
    /// Matched reference entities / reference entities, in [0, 1].
    pub fraction: f64,
    pub common: Vec<String>,
    pub missing: Vec<String>,
}

/// A reference entity is covered when some student entity of the same type
/// has the same name, contains or is contained in it, or is similar beyond
/// the keyword-match threshold.
pub fn entity_overlap(student: &[KeywordEntry], reference: &[KeywordEntry], policy: &ScoringPolicy) -> EntityOverlap {
    let mut overlap = EntityOverlap::default();

    for r in reference {
        if overlap.common.contains(&r.name) || overlap.missing.contains(&r.name) {
            continue;
        }
        let covered = student.iter().any(|s| {
            s.entity_type == r.entity_type
                && (s.name == r.name
                    || keyword_similarity(&r.name, &s.name, policy.containment_similarity)
                        > policy.keyword_match_threshold)
        });
        if covered {
            overlap.common.push(r.name.clone());
        } else {
            overlap.missing.push(r.name.clone());
        }
    }

    let total = overlap.common.len() + overlap.missing.len();
    if total > 0 {
        overlap.fraction = overlap.common.len() as f64 / total as f64;
    }
    overlap
}

/// `max(0, 1 - |a - b|) * 100` for sentiment scores in [-1, 1].
pub fn sentiment_similarity(student: f64, reference: f64) -> f64 {
    (1.0 - (student - reference).abs()).max(0.0) * 100.0
}

/// Best position-wise agreement between a sliding window over the student's
/// part-of-speech tags and the start of the reference tags, as a percentage
/// of the reference length.
pub fn syntax_similarity(student: &[String], reference: &[String]) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }
    let window = student.len().min(reference.len());
    let positions = student.len() - window + 1;

    let best = (0..positions)
        .map(|start| {
            student[start..start + window]
                .iter()
                .zip(reference)
                .filter(|(a, b)| a == b)
                .count()
        })
        .max()
        .unwrap_or(0);

    best as f64 / reference.len() as f64 * 100.0
}

/// Overall topical relevance in [0, 100].
///
/// Combines entity coverage (40%), whole-text sequence similarity (30%) and
/// reference word coverage (30%) over lower-cased, trimmed texts.
pub fn relevance_score(student_text: &str, reference_text: &str, entity_fraction: f64) -> f64 {
    let student = student_text.trim().to_lowercase();
    let reference = reference_text.trim().to_lowercase();

    let sequence = sequence_ratio(&student, &reference);
    let words = word_overlap(&student, &reference);

    (0.4 * entity_fraction + 0.3 * sequence + 0.3 * words) * 100.0
}

/// Builds the full signal bundle for a (student, reference) pair, applying
/// the relevance threshold from `policy`.
pub fn derive_signals(
    student_text: &str,
    student: &TextAnalysis,
    reference_text: &str,
    reference: &TextAnalysis,
    policy: &ScoringPolicy,
) -> SimilaritySignals {
    let overlap = entity_overlap(&student.entities, &reference.entities, policy);
    let relevance = relevance_score(student_text, reference_text, overlap.fraction);

    if RelevanceGate::from_policy(policy).evaluate(relevance).is_rejected() {
        let mut missing = overlap.common;
        missing.extend(overlap.missing);
        return SimilaritySignals::irrelevant(relevance, missing);
    }

    SimilaritySignals {
        entity_similarity: overlap.fraction * 100.0,
        syntax_similarity: syntax_similarity(&student.syntax, &reference.syntax),
        sentiment_similarity: sentiment_similarity(student.sentiment, reference.sentiment),
        relevance_score: relevance,
        is_relevant: true,
        common_entities: overlap.common,
        missing_entities: overlap.missing,
    }
}
