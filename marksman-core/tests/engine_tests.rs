// marksman-core/tests/engine_tests.rs
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use marksman_core::*;

const EPSILON: f64 = 1e-9;

const REFERENCE: &str = "A stack is a LIFO structure while a queue is FIFO";
const STUDENT: &str = "A stack is LIFO";
const OFF_TOPIC: &str = "zz";

fn tags(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

fn fixture() -> StaticAnalyzer {
    StaticAnalyzer::new()
        .with_text(
            REFERENCE,
            TextAnalysis {
                entities: vec![
                    KeywordEntry::new("Stack", 0.6, EntityType::Other, 2),
                    KeywordEntry::new("Queue", 0.4, EntityType::Other, 1),
                ],
                sentiment: 0.1,
                syntax: tags("DET NOUN VERB DET NOUN NOUN SCONJ DET NOUN VERB NOUN"),
            },
        )
        .with_text(
            STUDENT,
            TextAnalysis {
                entities: vec![KeywordEntry::new("stack", 0.9, EntityType::Other, 1)],
                sentiment: 0.1,
                syntax: tags("DET NOUN VERB NOUN"),
            },
        )
        .with_text(
            OFF_TOPIC,
            TextAnalysis {
                entities: vec![KeywordEntry::new("football", 1.0, EntityType::Event, 1)],
                sentiment: -0.8,
                syntax: tags("X"),
            },
        )
}

fn engine(policy: ScoringPolicy) -> GradingEngine {
    GradingEngine::new(Arc::new(fixture()), policy)
}

#[test_log::test(tokio::test)]
async fn test_partial_answer_with_default_policy() {
    let result = engine(ScoringPolicy::default()).score(STUDENT, REFERENCE, 10.0, None).await.unwrap();

    assert_eq!(result.status, GradingStatus::Graded);
    assert!(result.is_relevant);
    // stack: 0.6 * 1.1 * 0.5 = 0.33, the only credited keyword, so the keyword
    // score is (0.33 + 0.2 * 0.33) / 0.33 * 100 with the partial-band bonus
    assert!((result.keyword_score - 120.0).abs() < EPSILON);
    // keyword score above 30 lifts the semantic score to at least 25
    assert!(result.semantic_score >= 25.0);
    assert_eq!(result.matched_keywords, vec!["stack"]);
    assert_eq!(result.missing_keywords, vec!["queue"]);
    assert!((result.final_score - marksman_scoring::round2(result.percentage / 10.0)).abs() < 0.011);
}

#[test_log::test(tokio::test)]
async fn test_legacy_profile_drops_partial_bonus() {
    let profile = load_profile_by_name("legacy").unwrap();
    let config = apply_profile_to_config(&profile, GradingConfig::default());
    let result = engine(config.policy).score(STUDENT, REFERENCE, 10.0, None).await.unwrap();

    assert!((result.keyword_score - 100.0).abs() < EPSILON);
}

#[test_log::test(tokio::test)]
async fn test_off_topic_answer_is_gated() {
    let result = engine(ScoringPolicy::default()).score(OFF_TOPIC, REFERENCE, 10.0, None).await.unwrap();

    assert_eq!(result.status, GradingStatus::Irrelevant);
    assert!(!result.is_relevant);
    assert_eq!(result.final_score, 0.0);
    assert_eq!(result.keyword_score, 0.0);
    assert!(result.relevance_score < 10.0);
    assert_eq!(result.missing_keywords, vec!["stack", "queue"]);
}

#[test_log::test(tokio::test)]
async fn test_gate_zeroes_answer_that_names_a_reference_keyword() {
    let reference = "Mitochondria produce ATP via cellular respiration";
    let student = "qqq";
    let reference_analysis = TextAnalysis {
        entities: ["mitochondria", "atp", "respiration", "glucose", "oxygen"]
            .into_iter()
            .map(|name| KeywordEntry::new(name, 0.2, EntityType::Other, 1))
            .collect(),
        sentiment: 0.0,
        syntax: tags("NOUN VERB NOUN ADP ADJ NOUN"),
    };
    let student_analysis = TextAnalysis {
        entities: vec![KeywordEntry::new("ATP", 1.0, EntityType::Other, 1)],
        sentiment: 0.0,
        syntax: tags("NOUN VERB NOUN ADP ADJ NOUN"),
    };

    // Keyword matching on its own credits the shared keyword.
    let policy = ScoringPolicy::default();
    let index = marksman_scoring::KeywordIndex::build(reference_analysis.entities.clone());
    let outcome = marksman_scoring::match_keywords(&index, &student_analysis.entities, &policy);
    assert!(outcome.scores.get("atp").unwrap() > 0.0);

    let analyzer = StaticAnalyzer::new()
        .with_text(reference, reference_analysis)
        .with_text(student, student_analysis);
    let result = GradingEngine::new(Arc::new(analyzer), policy)
        .score(student, reference, 10.0, None)
        .await
        .unwrap();

    // One of five entities and no shared words keeps relevance at 8.
    assert!((result.relevance_score - 8.0).abs() < EPSILON);
    assert_eq!(result.status, GradingStatus::Irrelevant);
    assert!(!result.is_relevant);
    assert_eq!(result.final_score, 0.0);
    assert_eq!(result.keyword_score, 0.0);
    assert_eq!(result.semantic_score, 0.0);
    assert!(result.keyword_weights.is_empty());
    assert_eq!(result.missing_keywords.len(), 5);
}

#[test_log::test(tokio::test)]
async fn test_per_call_weights_override_policy() {
    let engine = engine(ScoringPolicy::default());
    let keyword_only = engine
        .score(STUDENT, REFERENCE, 10.0, Some(ScoreWeights::new(0.0, 1.0, 0.0)))
        .await
        .unwrap();
    assert!((keyword_only.percentage - 120.0).abs() < EPSILON);
}

#[test_log::test(tokio::test)]
async fn test_grade_wraps_result_in_report() {
    let request = GradingRequest::new(STUDENT, REFERENCE, 10.0).with_question_id("ds-3");
    let report = engine(ScoringPolicy::default()).grade(&request).await.unwrap();

    assert_eq!(report.question_id.as_deref(), Some("ds-3"));
    assert_eq!(report.answer_fingerprint, answer_fingerprint(STUDENT));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "graded");
    assert!(json["request_id"].is_string());
    assert!(json["final_score"].is_number());
}

#[test_log::test(tokio::test)]
async fn test_repeated_scoring_is_identical() {
    let engine = engine(ScoringPolicy::default());
    let first = engine.score(STUDENT, REFERENCE, 7.0, None).await.unwrap();
    let second = engine.score(STUDENT, REFERENCE, 7.0, None).await.unwrap();
    assert_eq!(first, second);
}

struct StalledAnalyzer;

#[async_trait]
impl LanguageAnalyzer for StalledAnalyzer {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn extract_entities(&self, _text: &str) -> Result<Vec<KeywordEntry>, AnalyzerError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }

    async fn analyze_sentiment(&self, _text: &str) -> Result<f64, AnalyzerError> {
        Ok(0.0)
    }

    async fn analyze_syntax(&self, _text: &str) -> Result<Vec<String>, AnalyzerError> {
        Ok(Vec::new())
    }
}

#[test_log::test(tokio::test)]
async fn test_stalled_analyzer_times_out() {
    let engine = GradingEngine::new(Arc::new(StalledAnalyzer), ScoringPolicy::default())
        .with_timeout(Duration::from_millis(50));

    let err = engine.score(STUDENT, REFERENCE, 10.0, None).await.unwrap_err();
    assert!(err.is_analysis_failure());
    match err {
        GradingError::AnalysisUnavailable { stage, source, .. } => {
            assert_eq!(stage, AnalysisStage::Entities);
            assert!(matches!(source, AnalyzerError::Timeout(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_batch_grading_over_fixture() {
    let engine = Arc::new(engine(ScoringPolicy::default()));
    let requests = vec![
        GradingRequest::new(STUDENT, REFERENCE, 10.0),
        GradingRequest::new("unknown answer", REFERENCE, 10.0),
        GradingRequest::new(OFF_TOPIC, REFERENCE, 10.0),
    ];

    let results = grade_batch(engine, requests, 2).await;
    assert_eq!(results[0].as_ref().unwrap().result.status, GradingStatus::Graded);
    assert!(results[1].as_ref().unwrap_err().is_analysis_failure());
    assert_eq!(results[2].as_ref().unwrap().result.status, GradingStatus::Irrelevant);
}
