// marksman/src/commands/mod.rs
//! Implementations of the `marksman` subcommands and the setup they share.

pub mod batch;
pub mod grade;
pub mod profiles;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};

use marksman_core::{
    apply_profile_to_config, load_profile_by_name, GoogleLanguageClient, GradingConfig, LanguageAnalyzer,
    StaticAnalyzer,
};

use crate::cli::PolicySource;

/// Builds the effective configuration: embedded defaults, then the optional
/// user config file, then the optional profile.
pub fn resolve_config(source: &PolicySource) -> Result<GradingConfig> {
    let mut config = match &source.config {
        Some(path) => {
            info!("Loading grading configuration from {}", path.display());
            GradingConfig::load_from_file(path)?
        }
        None => GradingConfig::load_default()?,
    };

    if let Some(name) = &source.profile {
        let profile = load_profile_by_name(name)?;
        info!("Using profile '{}' (version {}).", profile.profile_name, profile.version);
        config = apply_profile_to_config(&profile, config);
        config
            .validate()
            .with_context(|| format!("Profile '{}' produced an invalid configuration", name))?;
    }
    Ok(config)
}

/// Picks the fixture analyzer when `fixture` is given, the remote client otherwise.
pub fn build_analyzer(config: &GradingConfig, fixture: Option<&Path>) -> Result<Arc<dyn LanguageAnalyzer>> {
    match fixture {
        Some(path) => {
            debug!("Using fixture analyzer from {}", path.display());
            Ok(Arc::new(StaticAnalyzer::load_from_file(path)?))
        }
        None => {
            let client_config = config
                .analyzer
                .client_config()
                .context("Cannot reach the language analysis service")?;
            let client = GoogleLanguageClient::new(client_config).context("Failed to create analysis client")?;
            Ok(Arc::new(client))
        }
    }
}

/// Reads a text argument given inline or as a file.
pub(crate) fn read_text(inline: Option<&str>, file: Option<&Path>, what: &str) -> Result<Option<String>> {
    match (inline, file) {
        (Some(text), _) => Ok(Some(text.to_string())),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("Failed to read {} from {}", what, path.display())),
        (None, None) => Ok(None),
    }
}
