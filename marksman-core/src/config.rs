//! Configuration management for `marksman-core`.
//!
//! A [`GradingConfig`] pairs the scoring policy with the settings of the
//! language-analysis client. Defaults are embedded in the binary; a user YAML
//! file only needs to name the values it changes, which are merged over the
//! defaults by [`merge_config`].
//!
//! License: MIT OR Apache-2.0

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use marksman_scoring::{Blend, LeniencyPolicy, RedistributionMode, ScoreWeights, ScoringPolicy};
use serde::{Deserialize, Serialize};

use crate::analysis::google::{AnalyzerConfig, DEFAULT_ENDPOINT};
use crate::errors::AnalyzerError;

/// Environment variable holding the analysis API key unless configured otherwise.
pub const DEFAULT_API_KEY_ENV: &str = "MARKSMAN_API_KEY";

/// Settings for the remote language-analysis client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub endpoint: String,
    /// Name of the environment variable the API key is read from.
    pub api_key_env: String,
    /// Upper bound for every individual analyzer call.
    pub timeout_secs: u64,
    /// Maximum number of requests graded at once in batch mode.
    pub concurrency: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: 10,
            concurrency: 4,
        }
    }
}

impl AnalyzerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolves the API key from the environment and builds a client config.
    pub fn client_config(&self) -> Result<AnalyzerConfig, AnalyzerError> {
        let api_key = std::env::var(&self.api_key_env)
            .map_err(|_| AnalyzerError::NotConfigured(format!("environment variable {} is not set", self.api_key_env)))?;
        Ok(AnalyzerConfig {
            endpoint: self.endpoint.clone(),
            api_key,
            timeout: self.timeout(),
        })
    }
}

/// The top-level configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    pub policy: ScoringPolicy,
    pub analyzer: AnalyzerSettings,
}

/// Policy values to change. Every field left out keeps its current value.
///
/// `weights` and the blends are replaced as a whole; a `leniency` block
/// replaces the whole leniency policy, with omitted fields at their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOverrides {
    pub weights: Option<ScoreWeights>,
    pub relevance_threshold: Option<f64>,
    pub keyword_match_threshold: Option<f64>,
    pub containment_similarity: Option<f64>,
    pub type_bonus: Option<f64>,
    pub mention_ratio_cap: Option<f64>,
    pub missing_threshold: Option<f64>,
    pub redistribution: Option<RedistributionMode>,
    pub partial_band: Option<(f64, f64)>,
    pub partial_bonus: Option<f64>,
    pub semantic_blend: Option<Blend>,
    pub structure_blend: Option<Blend>,
    pub leniency: Option<LeniencyPolicy>,
    #[serde(flatten, skip_serializing)]
    pub unknown: BTreeMap<String, serde_yml::Value>,
}

macro_rules! override_field {
    ($src:expr, $dst:expr, $field:ident) => {
        if let Some(value) = $src.$field {
            debug!("Overriding policy.{} with {:?}", stringify!($field), value);
            $dst.$field = value;
        }
    };
}

impl PolicyOverrides {
    pub fn apply_to(&self, policy: &mut ScoringPolicy) {
        for key in self.unknown.keys() {
            warn!("Unknown policy key '{}' will be ignored.", key);
        }
        override_field!(self, policy, weights);
        override_field!(self, policy, relevance_threshold);
        override_field!(self, policy, keyword_match_threshold);
        override_field!(self, policy, containment_similarity);
        override_field!(self, policy, type_bonus);
        override_field!(self, policy, mention_ratio_cap);
        override_field!(self, policy, missing_threshold);
        override_field!(self, policy, redistribution);
        override_field!(self, policy, partial_band);
        override_field!(self, policy, partial_bonus);
        override_field!(self, policy, semantic_blend);
        override_field!(self, policy, structure_blend);
        override_field!(self, policy, leniency);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOverrides {
    pub endpoint: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
}

/// A user configuration file: only the values that differ from the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub policy: PolicyOverrides,
    pub analyzer: AnalyzerOverrides,
}

impl UserConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading user configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yml::from_str(&text).with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

impl GradingConfig {
    /// Loads the embedded default configuration.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default configuration from embedded string...");
        let default_yaml = include_str!("../config/default_config.yaml");
        let config: GradingConfig =
            serde_yml::from_str(default_yaml).context("Failed to parse default configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a user file and merges it over the embedded defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let user = UserConfig::load_from_file(path)?;
        let config = merge_config(Self::load_default()?, Some(user))
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!("Loaded configuration from {}.", path.display());
        Ok(config)
    }

    /// Checks weights and the ranges of every threshold.
    pub fn validate(&self) -> Result<()> {
        let p = &self.policy;
        let mut errors = Vec::new();

        if let Err(e) = p.weights.validate() {
            errors.push(e.to_string());
        }
        let unit = |name: &str, v: f64, errors: &mut Vec<String>| {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                errors.push(format!("'{}' must be within [0, 1], got {}", name, v));
            }
        };
        unit("keyword_match_threshold", p.keyword_match_threshold, &mut errors);
        unit("containment_similarity", p.containment_similarity, &mut errors);
        unit("missing_threshold", p.missing_threshold, &mut errors);
        unit("partial_bonus", p.partial_bonus, &mut errors);

        if !p.relevance_threshold.is_finite() || !(0.0..=100.0).contains(&p.relevance_threshold) {
            errors.push(format!("'relevance_threshold' must be within [0, 100], got {}", p.relevance_threshold));
        }
        if p.type_bonus.is_nan() || p.type_bonus < 1.0 {
            errors.push(format!("'type_bonus' must be at least 1.0, got {}", p.type_bonus));
        }
        if p.mention_ratio_cap.is_nan() || p.mention_ratio_cap <= 0.0 {
            errors.push(format!("'mention_ratio_cap' must be positive, got {}", p.mention_ratio_cap));
        }
        let (low, high) = p.partial_band;
        if !(0.0 <= low && low < high && high <= 1.0) {
            errors.push(format!("'partial_band' must satisfy 0 <= low < high <= 1, got [{}, {})", low, high));
        }
        for (name, blend) in [("semantic_blend", p.semantic_blend), ("structure_blend", p.structure_blend)] {
            if ((blend.primary + blend.secondary) - 1.0).abs() > marksman_scoring::policy::WEIGHT_SUM_EPSILON {
                errors.push(format!("'{}' must sum to 1.0", name));
            }
        }
        if self.analyzer.timeout_secs == 0 {
            errors.push("'analyzer.timeout_secs' must be greater than 0".to_string());
        }
        if self.analyzer.concurrency == 0 {
            errors.push("'analyzer.concurrency' must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Configuration validation failed:\n{}", errors.join("\n")))
        }
    }
}

/// Merges user overrides into the defaults and validates the result.
pub fn merge_config(default_config: GradingConfig, user_config: Option<UserConfig>) -> Result<GradingConfig> {
    let mut merged = default_config;

    if let Some(user) = user_config {
        debug!("User config provided. Merging overrides.");
        user.policy.apply_to(&mut merged.policy);

        let a = user.analyzer;
        if let Some(endpoint) = a.endpoint {
            merged.analyzer.endpoint = endpoint;
        }
        if let Some(env) = a.api_key_env {
            merged.analyzer.api_key_env = env;
        }
        if let Some(timeout) = a.timeout_secs {
            merged.analyzer.timeout_secs = timeout;
        }
        if let Some(concurrency) = a.concurrency {
            merged.analyzer.concurrency = concurrency;
        }
    }

    merged.validate()?;
    Ok(merged)
}
