//! errors.rs - Custom error types for the marksman-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::time::Duration;

use marksman_scoring::ScoringError;
use thiserror::Error;

/// Which of the two texts of a grading request an error concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Student,
    Reference,
}

impl fmt::Display for TextRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextRole::Student => f.write_str("student answer"),
            TextRole::Reference => f.write_str("reference answer"),
        }
    }
}

/// The analyzer call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Entities,
    Sentiment,
    Syntax,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisStage::Entities => f.write_str("entity extraction"),
            AnalysisStage::Sentiment => f.write_str("sentiment analysis"),
            AnalysisStage::Syntax => f.write_str("syntax analysis"),
        }
    }
}

/// Failure of the external language-analysis collaborator.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalyzerError {
    #[error("HTTP request to the analysis service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis service responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode analysis response: {0}")]
    Decode(String),

    #[error("Analysis did not complete within {0:?}")]
    Timeout(Duration),

    #[error("No analysis is available for the given text")]
    UnknownText,

    #[error("Analyzer is not configured: {0}")]
    NotConfigured(String),
}

/// The input constraint a grading request violated.
#[derive(Debug, Clone, PartialEq)]
pub enum InputConstraint {
    BlankReference,
    NonPositiveMaxMarks(f64),
    WeightsDoNotSumToOne(f64),
    WeightOutOfRange { field: &'static str, value: f64 },
}

impl fmt::Display for InputConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputConstraint::BlankReference => write!(f, "reference answer must not be blank"),
            InputConstraint::NonPositiveMaxMarks(m) => {
                write!(f, "max marks must be a positive number, got {}", m)
            }
            InputConstraint::WeightsDoNotSumToOne(s) => {
                write!(f, "score weights must sum to 1.0, got {}", s)
            }
            InputConstraint::WeightOutOfRange { field, value } => {
                write!(f, "score weight '{}' must be within [0, 1], got {}", field, value)
            }
        }
    }
}

/// This enum represents all possible error types in the `marksman-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GradingError {
    #[error("Language analysis unavailable during {stage} of the {text}: {source}")]
    AnalysisUnavailable {
        text: TextRole,
        stage: AnalysisStage,
        #[source]
        source: AnalyzerError,
    },

    #[error("Invalid grading input: {0}")]
    InvalidInput(InputConstraint),

    #[error("Score calculation failed: {0}")]
    ScoreCalculation(#[from] ScoringError),

    #[error("Invalid grading configuration: {0}")]
    Config(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
}

impl GradingError {
    /// Maps weight problems reported by the scoring crate onto the input
    /// constraint the caller violated.
    pub fn from_weights(err: ScoringError) -> Self {
        match err {
            ScoringError::WeightsDoNotSumToOne(sum) => {
                GradingError::InvalidInput(InputConstraint::WeightsDoNotSumToOne(sum))
            }
            ScoringError::WeightOutOfRange { field, value } => {
                GradingError::InvalidInput(InputConstraint::WeightOutOfRange { field, value })
            }
            other => GradingError::ScoreCalculation(other),
        }
    }

    /// True for failures of the external analyzer, the only ones a caller
    /// might reasonably retry.
    pub fn is_analysis_failure(&self) -> bool {
        matches!(self, GradingError::AnalysisUnavailable { .. })
    }
}
