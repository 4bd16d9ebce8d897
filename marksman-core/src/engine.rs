// marksman-core/src/engine.rs
//! The grading engine.
//!
//! [`GradingEngine::score`] validates the request, obtains language analysis
//! for both texts through the [`LanguageAnalyzer`] collaborator and runs the
//! pure scoring pipeline from `marksman-scoring`:
//! keyword index, relevance gate, keyword matching, redistribution and
//! fusion. The engine holds no per-request state and can be shared freely
//! between tasks.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use marksman_scoring::{
    combine, derive_signals, match_keywords, redistribute, round2, KeywordIndex, KeywordScoreMap, ScoreWeights,
    ScoringPolicy,
};
use serde::{Deserialize, Serialize};

use crate::analysis::{analyze_text, LanguageAnalyzer};
use crate::config::GradingConfig;
use crate::errors::{GradingError, InputConstraint, TextRole};
use crate::report::{GradingReport, GradingRequest};

/// How a result was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingStatus {
    Graded,
    /// The student answer was blank; no analysis was requested.
    EmptyAnswer,
    /// The relevance gate rejected the answer.
    Irrelevant,
}

impl fmt::Display for GradingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingStatus::Graded => f.write_str("graded"),
            GradingStatus::EmptyAnswer => f.write_str("empty answer"),
            GradingStatus::Irrelevant => f.write_str("irrelevant"),
        }
    }
}

/// The graded outcome of one (student, reference) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    pub final_score: f64,
    pub max_marks: f64,
    pub percentage: f64,
    pub semantic_score: f64,
    pub keyword_score: f64,
    pub structure_score: f64,
    pub relevance_score: f64,
    pub is_relevant: bool,
    /// Raw signals behind the semantic and structure sub-scores.
    pub entity_similarity: f64,
    pub syntax_similarity: f64,
    pub sentiment_similarity: f64,
    /// Redistributed credit per reference keyword, in reference order.
    #[serde(default)]
    pub keyword_weights: Vec<KeywordWeight>,
    /// Reference entities the student covered.
    pub matched_keywords: Vec<String>,
    /// Reference entities the student did not cover.
    pub missing_keywords: Vec<String>,
    /// Reference keywords whose normalized score lies in the partial band.
    pub partial_matches: Vec<String>,
    /// Reference keywords that earned any keyword credit.
    pub extracted_keywords: Vec<String>,
    pub status: GradingStatus,
}

/// Keyword credit after redistribution, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordWeight {
    pub keyword: String,
    pub weight: f64,
}

fn keyword_weights(scores: &KeywordScoreMap) -> Vec<KeywordWeight> {
    scores
        .iter()
        .map(|(keyword, weight)| KeywordWeight {
            keyword: keyword.to_string(),
            weight: round2(weight),
        })
        .collect()
}

impl GradingResult {
    fn zero(max_marks: f64, status: GradingStatus) -> Self {
        Self {
            final_score: 0.0,
            max_marks,
            percentage: 0.0,
            semantic_score: 0.0,
            keyword_score: 0.0,
            structure_score: 0.0,
            relevance_score: 0.0,
            is_relevant: false,
            entity_similarity: 0.0,
            syntax_similarity: 0.0,
            sentiment_similarity: 0.0,
            keyword_weights: Vec::new(),
            matched_keywords: Vec::new(),
            missing_keywords: Vec::new(),
            partial_matches: Vec::new(),
            extracted_keywords: Vec::new(),
            status,
        }
    }
}

fn partial_matches(scores: &KeywordScoreMap, policy: &ScoringPolicy) -> Vec<String> {
    let (low, high) = policy.partial_band;
    scores
        .iter()
        .filter(|(_, v)| (low..high).contains(v))
        .map(|(name, _)| name.to_string())
        .collect()
}

pub struct GradingEngine {
    analyzer: Arc<dyn LanguageAnalyzer>,
    policy: ScoringPolicy,
    analysis_timeout: Duration,
}

impl GradingEngine {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(analyzer: Arc<dyn LanguageAnalyzer>, policy: ScoringPolicy) -> Self {
        Self {
            analyzer,
            policy,
            analysis_timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Builds an engine from a validated configuration.
    pub fn from_config(config: &GradingConfig, analyzer: Arc<dyn LanguageAnalyzer>) -> Result<Self, GradingError> {
        config
            .validate()
            .map_err(|e| GradingError::Config(format!("{:#}", e)))?;
        Ok(Self::new(analyzer, config.policy.clone()).with_timeout(config.analyzer.timeout()))
    }

    /// Sets the limit applied to each individual analyzer call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn analyzer_name(&self) -> &str {
        self.analyzer.name()
    }

    fn validate_input(&self, reference: &str, max_marks: f64, weights: &ScoreWeights) -> Result<(), GradingError> {
        if reference.trim().is_empty() {
            return Err(GradingError::InvalidInput(InputConstraint::BlankReference));
        }
        if !max_marks.is_finite() || max_marks <= 0.0 {
            return Err(GradingError::InvalidInput(InputConstraint::NonPositiveMaxMarks(max_marks)));
        }
        weights.validate().map_err(GradingError::from_weights)
    }

    /// Grades `student` against `reference` out of `max_marks`.
    ///
    /// `weights` overrides the policy weights for this call only. A blank
    /// student answer yields a zero [`GradingStatus::EmptyAnswer`] result
    /// without calling the analyzer.
    pub async fn score(
        &self,
        student: &str,
        reference: &str,
        max_marks: f64,
        weights: Option<ScoreWeights>,
    ) -> Result<GradingResult, GradingError> {
        let weights = weights.unwrap_or(self.policy.weights);
        self.validate_input(reference, max_marks, &weights)?;

        let student = student.trim();
        let reference = reference.trim();
        if student.is_empty() {
            debug!("Student answer is blank; returning a zero result.");
            return Ok(GradingResult::zero(max_marks, GradingStatus::EmptyAnswer));
        }

        let analyzer = self.analyzer.as_ref();
        let (student_analysis, reference_analysis) = tokio::try_join!(
            analyze_text(analyzer, student, TextRole::Student, self.analysis_timeout),
            analyze_text(analyzer, reference, TextRole::Reference, self.analysis_timeout),
        )?;

        let signals = derive_signals(student, &student_analysis, reference, &reference_analysis, &self.policy);
        debug!(
            "Signals: entity {:.2}, syntax {:.2}, sentiment {:.2}, relevance {:.2}",
            signals.entity_similarity, signals.syntax_similarity, signals.sentiment_similarity, signals.relevance_score
        );

        if !signals.is_relevant {
            info!("Answer rejected by relevance gate ({:.2}).", signals.relevance_score);
            return Ok(GradingResult {
                relevance_score: round2(signals.relevance_score),
                missing_keywords: signals.missing_entities,
                ..GradingResult::zero(max_marks, GradingStatus::Irrelevant)
            });
        }

        let index = KeywordIndex::build(reference_analysis.entities);
        let outcome = match_keywords(&index, &student_analysis.entities, &self.policy);
        let redistributed = redistribute(&outcome.scores, self.policy.missing_threshold, self.policy.redistribution);
        let combined = combine(&signals, &redistributed, &outcome.scores, max_marks, &weights, &self.policy)?;

        info!(
            "Graded answer: {:.2}/{} ({:.2}%).",
            combined.final_score, max_marks, combined.final_percentage
        );

        Ok(GradingResult {
            final_score: combined.final_score,
            max_marks,
            percentage: combined.final_percentage,
            semantic_score: combined.semantic_score,
            keyword_score: combined.keyword_score,
            structure_score: combined.structure_score,
            relevance_score: round2(signals.relevance_score),
            is_relevant: true,
            entity_similarity: round2(signals.entity_similarity),
            syntax_similarity: round2(signals.syntax_similarity),
            sentiment_similarity: round2(signals.sentiment_similarity),
            keyword_weights: keyword_weights(&redistributed),
            matched_keywords: signals.common_entities,
            missing_keywords: signals.missing_entities,
            partial_matches: partial_matches(&outcome.scores, &self.policy),
            extracted_keywords: outcome.extracted,
            status: GradingStatus::Graded,
        })
    }

    /// Grades a request and wraps the result with request metadata.
    pub async fn grade(&self, request: &GradingRequest) -> Result<GradingReport, GradingError> {
        let result = self
            .score(
                &request.student_answer,
                &request.reference_answer,
                request.max_marks,
                request.weights,
            )
            .await?;
        Ok(GradingReport::new(request, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StaticAnalyzer;
    use crate::errors::AnalysisStage;
    use marksman_scoring::{EntityType, KeywordEntry, TextAnalysis};

    const REFERENCE: &str = "A stack is a LIFO structure while a queue is FIFO";

    fn engine_with(analyzer: StaticAnalyzer) -> GradingEngine {
        GradingEngine::new(Arc::new(analyzer), ScoringPolicy::default())
    }

    fn reference_analysis() -> TextAnalysis {
        TextAnalysis {
            entities: vec![
                KeywordEntry::new("stack", 0.6, EntityType::Other, 2),
                KeywordEntry::new("queue", 0.4, EntityType::Other, 1),
            ],
            sentiment: 0.0,
            syntax: vec!["DET".into(), "NOUN".into(), "VERB".into()],
        }
    }

    #[tokio::test]
    async fn test_blank_answer_skips_analysis() {
        // An empty analyzer fails on any lookup, so success proves it was not called.
        let engine = engine_with(StaticAnalyzer::new());
        let result = engine.score("   ", REFERENCE, 10.0, None).await.unwrap();
        assert_eq!(result.status, GradingStatus::EmptyAnswer);
        assert_eq!(result.final_score, 0.0);
        assert_eq!(result.max_marks, 10.0);
    }

    #[tokio::test]
    async fn test_blank_reference_is_invalid() {
        let engine = engine_with(StaticAnalyzer::new());
        let err = engine.score("an answer", " ", 10.0, None).await.unwrap_err();
        assert!(matches!(err, GradingError::InvalidInput(InputConstraint::BlankReference)));
    }

    #[tokio::test]
    async fn test_non_positive_max_marks() {
        let engine = engine_with(StaticAnalyzer::new());
        for marks in [0.0, -3.0, f64::NAN] {
            let err = engine.score("x", REFERENCE, marks, None).await.unwrap_err();
            assert!(matches!(err, GradingError::InvalidInput(InputConstraint::NonPositiveMaxMarks(_))));
        }
    }

    #[tokio::test]
    async fn test_weights_must_sum_to_one() {
        let engine = engine_with(StaticAnalyzer::new());
        let err = engine
            .score("x", REFERENCE, 10.0, Some(ScoreWeights::new(0.5, 0.5, 0.5)))
            .await
            .unwrap_err();
        assert!(matches!(err, GradingError::InvalidInput(InputConstraint::WeightsDoNotSumToOne(_))));
    }

    #[tokio::test]
    async fn test_unknown_student_text_names_text_and_stage() {
        let analyzer = StaticAnalyzer::new().with_text(REFERENCE, reference_analysis());
        let engine = engine_with(analyzer);
        let err = engine.score("not in the fixture", REFERENCE, 10.0, None).await.unwrap_err();
        match err {
            GradingError::AnalysisUnavailable { text, stage, .. } => {
                assert_eq!(text, TextRole::Student);
                assert_eq!(stage, AnalysisStage::Entities);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_partial_matches_reported_from_pre_redistribution_scores() {
        let student = "A stack is LIFO";
        let analyzer = StaticAnalyzer::new()
            .with_text(REFERENCE, reference_analysis())
            .with_text(
                student,
                TextAnalysis {
                    entities: vec![KeywordEntry::new("stack", 0.9, EntityType::Other, 1)],
                    sentiment: 0.0,
                    syntax: vec!["DET".into(), "NOUN".into(), "VERB".into()],
                },
            );
        let result = engine_with(analyzer).score(student, REFERENCE, 10.0, None).await.unwrap();

        assert_eq!(result.status, GradingStatus::Graded);
        assert_eq!(result.matched_keywords, vec!["stack"]);
        assert_eq!(result.missing_keywords, vec!["queue"]);
        assert_eq!(result.partial_matches, vec!["stack"]);
        assert_eq!(result.extracted_keywords, vec!["stack"]);
        assert!(result.final_score > 0.0 && result.final_score <= 10.0);
    }

    #[tokio::test]
    async fn test_result_explains_signals_and_keyword_weights() {
        let student = "A stack is LIFO";
        let analyzer = StaticAnalyzer::new()
            .with_text(REFERENCE, reference_analysis())
            .with_text(
                student,
                TextAnalysis {
                    entities: vec![KeywordEntry::new("stack", 0.9, EntityType::Other, 1)],
                    sentiment: 0.0,
                    syntax: vec!["DET".into(), "NOUN".into(), "VERB".into()],
                },
            );
        let result = engine_with(analyzer).score(student, REFERENCE, 10.0, None).await.unwrap();

        assert_eq!(result.entity_similarity, 50.0);
        assert_eq!(result.syntax_similarity, 100.0);
        assert_eq!(result.sentiment_similarity, 100.0);
        assert_eq!(
            result.keyword_weights,
            vec![
                KeywordWeight { keyword: "stack".into(), weight: 0.33 },
                KeywordWeight { keyword: "queue".into(), weight: 0.0 },
            ]
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["keyword_weights"][0]["keyword"], "stack");
    }
}
