// File: marksman-core/src/headless.rs

//! `headless.rs`
//! Convenience wrapper for one-shot grading without managing an engine.

use std::sync::Arc;

use crate::analysis::LanguageAnalyzer;
use crate::config::GradingConfig;
use crate::engine::GradingEngine;
use crate::errors::GradingError;
use crate::report::{GradingReport, GradingRequest};

/// Builds an engine from `config` and `analyzer`, and grades a single request.
///
/// # Arguments
///
/// * `config` - The merged GradingConfig (defaults + optional user overrides and profile).
/// * `analyzer` - The language-analysis collaborator to use.
/// * `request` - The answer to grade.
pub async fn headless_grade(
    config: &GradingConfig,
    analyzer: Arc<dyn LanguageAnalyzer>,
    request: &GradingRequest,
) -> Result<GradingReport, GradingError> {
    let engine = GradingEngine::from_config(config, analyzer)?;
    engine.grade(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StaticAnalyzer;
    use crate::engine::GradingStatus;

    #[tokio::test]
    async fn test_headless_grade_empty_answer() {
        let request = GradingRequest::new("", "Photosynthesis converts light to energy", 4.0).with_question_id("bio-1");
        let report = headless_grade(&GradingConfig::default(), Arc::new(StaticAnalyzer::new()), &request)
            .await
            .unwrap();

        assert_eq!(report.question_id.as_deref(), Some("bio-1"));
        assert_eq!(report.result.status, GradingStatus::EmptyAnswer);
        assert_eq!(report.answer_fingerprint.len(), 64);
    }

    #[tokio::test]
    async fn test_headless_grade_rejects_invalid_config() {
        let mut config = GradingConfig::default();
        config.analyzer.concurrency = 0;
        let request = GradingRequest::new("a", "b", 4.0);
        let err = headless_grade(&config, Arc::new(StaticAnalyzer::new()), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, GradingError::Config(_)));
    }
}
