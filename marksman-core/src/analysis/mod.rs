// marksman-core/src/analysis/mod.rs
//! The language-analysis collaborator.
//!
//! The scoring engine never computes entities, sentiment or part-of-speech
//! tags itself. It consumes them through the [`LanguageAnalyzer`] trait, so a
//! remote service ([`GoogleLanguageClient`]) and an in-memory fixture
//! ([`StaticAnalyzer`]) are interchangeable.
//!
//! License: MIT OR APACHE 2.0

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use marksman_scoring::{KeywordEntry, TextAnalysis};

use crate::errors::{AnalysisStage, AnalyzerError, GradingError, TextRole};

pub mod fixture;
pub mod google;

pub use fixture::StaticAnalyzer;
pub use google::GoogleLanguageClient;

/// A provider of raw language-analysis measurements for a single text.
#[async_trait]
pub trait LanguageAnalyzer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Entities with salience, type and mention count.
    async fn extract_entities(&self, text: &str) -> Result<Vec<KeywordEntry>, AnalyzerError>;

    /// Document sentiment in [-1, 1].
    async fn analyze_sentiment(&self, text: &str) -> Result<f64, AnalyzerError>;

    /// Part-of-speech tag per token, in order.
    async fn analyze_syntax(&self, text: &str) -> Result<Vec<String>, AnalyzerError>;

    /// All three measurements at once, without per-stage timeouts.
    async fn analyze(&self, text: &str) -> Result<TextAnalysis, AnalyzerError> {
        let (entities, sentiment, syntax) = tokio::try_join!(
            self.extract_entities(text),
            self.analyze_sentiment(text),
            self.analyze_syntax(text),
        )?;
        Ok(TextAnalysis { entities, sentiment, syntax })
    }
}

async fn timed<T, F>(call: F, limit: Duration, text: TextRole, stage: AnalysisStage) -> Result<T, GradingError>
where
    F: Future<Output = Result<T, AnalyzerError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(GradingError::AnalysisUnavailable { text, stage, source }),
        Err(_) => Err(GradingError::AnalysisUnavailable {
            text,
            stage,
            source: AnalyzerError::Timeout(limit),
        }),
    }
}

/// Runs the three analyzer calls for one text concurrently, each bounded by
/// `limit`. The first failure aborts the whole analysis; nothing is retried.
pub async fn analyze_text(
    analyzer: &dyn LanguageAnalyzer,
    text: &str,
    role: TextRole,
    limit: Duration,
) -> Result<TextAnalysis, GradingError> {
    debug!("Analyzing {} with '{}' analyzer.", role, analyzer.name());

    let (entities, sentiment, syntax) = tokio::try_join!(
        timed(analyzer.extract_entities(text), limit, role, AnalysisStage::Entities),
        timed(analyzer.analyze_sentiment(text), limit, role, AnalysisStage::Sentiment),
        timed(analyzer.analyze_syntax(text), limit, role, AnalysisStage::Syntax),
    )?;

    Ok(TextAnalysis {
        entities: entities.into_iter().map(KeywordEntry::normalized).collect(),
        sentiment,
        syntax,
    })
}
