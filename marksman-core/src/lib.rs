// marksman-core/src/lib.rs
//! # marksman Core Library
//!
//! `marksman-core` grades a free-text student answer against a reference
//! answer. It wires the pure scoring algorithms of `marksman-scoring` to an
//! external language-analysis service, validates inputs, and loads the
//! grading policy from configuration files and named profiles.
//!
//! ## Modules
//!
//! * `analysis`: The `LanguageAnalyzer` trait, the Cloud Natural Language client and an in-memory fixture analyzer.
//! * `config`: `GradingConfig`, user overrides and their validation.
//! * `profiles`: Named policy variants, looked up on disk or among the built-in profiles.
//! * `engine`: `GradingEngine` and `GradingResult`.
//! * `report`: Grading requests and auditable grading reports.
//! * `batch`: Concurrent grading of independent requests.
//! * `headless`: One-shot convenience wrapper.
//! * `errors`: Typed errors.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use marksman_core::{headless_grade, GradingConfig, GradingRequest, StaticAnalyzer};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = GradingConfig::load_default()?;
//! let analyzer = StaticAnalyzer::load_from_file("fixtures/analyses.yaml")?;
//! let request = GradingRequest::new("A stack is LIFO", "A stack is a LIFO structure", 10.0);
//!
//! let report = headless_grade(&config, Arc::new(analyzer), &request).await?;
//! println!("{} / {}", report.result.final_score, report.result.max_marks);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Grading returns [`GradingError`], which tells apart analyzer failures
//! (with the text and stage that failed), invalid input and internal scoring
//! errors. Configuration and profile loading use `anyhow::Result`.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod analysis;
pub mod batch;
pub mod config;
pub mod engine;
pub mod errors;
pub mod headless;
pub mod profiles;
pub mod report;

pub use analysis::{analyze_text, GoogleLanguageClient, LanguageAnalyzer, StaticAnalyzer};
pub use analysis::google::AnalyzerConfig;
pub use batch::grade_batch;
pub use config::{merge_config, AnalyzerSettings, GradingConfig, PolicyOverrides, UserConfig, DEFAULT_API_KEY_ENV};
pub use engine::{GradingEngine, GradingResult, GradingStatus, KeywordWeight};
pub use errors::{AnalysisStage, AnalyzerError, GradingError, InputConstraint, TextRole};
pub use headless::headless_grade;
pub use profiles::{
    apply_profile_to_config, list_available_profiles, load_profile_by_name, profile_candidate_paths, ProfileConfig,
    ProfileSummary,
};
pub use report::{answer_fingerprint, GradingReport, GradingRequest};

/// Re-exports of the scoring types that appear in this crate's API.
pub use marksman_scoring::{
    EntityType, KeywordEntry, LeniencyPolicy, RedistributionMode, ScoreWeights, ScoringPolicy, TextAnalysis,
};
