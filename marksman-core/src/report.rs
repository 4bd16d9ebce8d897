// marksman-core/src/report.rs
//! Grading requests and the reports produced for them.

use chrono::{DateTime, Utc};
use marksman_scoring::ScoreWeights;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::engine::GradingResult;

/// One answer to grade, as accepted by the CLI and by batch grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRequest {
    #[serde(default)]
    pub question_id: Option<String>,
    pub student_answer: String,
    pub reference_answer: String,
    pub max_marks: f64,
    /// Per-request weights, overriding the policy weights.
    #[serde(default)]
    pub weights: Option<ScoreWeights>,
}

impl GradingRequest {
    pub fn new(student_answer: impl Into<String>, reference_answer: impl Into<String>, max_marks: f64) -> Self {
        Self {
            question_id: None,
            student_answer: student_answer.into(),
            reference_answer: reference_answer.into(),
            max_marks,
            weights: None,
        }
    }

    pub fn with_question_id(mut self, question_id: impl Into<String>) -> Self {
        self.question_id = Some(question_id.into());
        self
    }
}

/// SHA-256 (hex) of the trimmed answer text.
pub fn answer_fingerprint(answer: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(answer.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// A [`GradingResult`] with the metadata needed to audit it later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingReport {
    pub request_id: Uuid,
    pub question_id: Option<String>,
    pub graded_at: DateTime<Utc>,
    pub answer_fingerprint: String,
    #[serde(flatten)]
    pub result: GradingResult,
}

impl GradingReport {
    pub fn new(request: &GradingRequest, result: GradingResult) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            question_id: request.question_id.clone(),
            graded_at: Utc::now(),
            answer_fingerprint: answer_fingerprint(&request.student_answer),
            result,
        }
    }
}
