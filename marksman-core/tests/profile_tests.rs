// marksman-core/tests/profile_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::Builder;

use marksman_core::config::{GradingConfig, PolicyOverrides};
use marksman_core::profiles::*;
use marksman_core::ScoreWeights;

fn profile(name: &str, version: &str, policy: PolicyOverrides) -> ProfileConfig {
    ProfileConfig {
        profile_name: name.to_string(),
        display_name: None,
        description: None,
        version: version.to_string(),
        policy,
        unknown: Default::default(),
    }
}

#[test]
fn test_profile_validation_success() -> Result<()> {
    let overrides = PolicyOverrides {
        weights: Some(ScoreWeights::new(0.2, 0.6, 0.2)),
        relevance_threshold: Some(15.0),
        ..PolicyOverrides::default()
    };
    profile("strict", "1.0", overrides).validate(&GradingConfig::default())?;
    Ok(())
}

#[test]
fn test_profile_validation_fails_on_empty_version() {
    let err = profile("strict", " ", PolicyOverrides::default())
        .validate(&GradingConfig::default())
        .unwrap_err();
    assert!(err.to_string().contains("'version' field cannot be empty"));
}

#[test]
fn test_profile_validation_fails_on_bad_weights() {
    let overrides = PolicyOverrides {
        weights: Some(ScoreWeights::new(0.5, 0.5, 0.5)),
        ..PolicyOverrides::default()
    };
    assert!(profile("broken", "1.0", overrides)
        .validate(&GradingConfig::default())
        .is_err());
}

#[test]
fn test_apply_profile_only_touches_overridden_fields() {
    let overrides = PolicyOverrides {
        partial_bonus: Some(0.0),
        ..PolicyOverrides::default()
    };
    let config = apply_profile_to_config(&profile("p", "1", overrides), GradingConfig::default());
    assert_eq!(config.policy.partial_bonus, 0.0);
    assert_eq!(config.policy.weights, ScoreWeights::default());
    assert!(config.policy.leniency.enabled);
}

#[test]
fn test_load_profile_from_path() -> Result<()> {
    let yaml = r#"
profile_name: exam-board
version: "2.1"
description: Stricter relevance gate
policy:
  relevance_threshold: 30
"#;
    let mut file = Builder::new().suffix(".yaml").tempfile()?;
    file.write_all(yaml.as_bytes())?;

    let loaded = load_profile_by_name(file.path().to_str().unwrap())?;
    assert_eq!(loaded.profile_name, "exam-board");
    assert_eq!(loaded.policy.relevance_threshold, Some(30.0));
    Ok(())
}

#[test]
fn test_builtin_profiles_are_listed() {
    let names: Vec<String> = list_available_profiles()
        .into_iter()
        .map(|p| p.profile_name)
        .collect();
    assert!(names.iter().any(|n| n == "lenient"));
    assert!(names.iter().any(|n| n == "legacy"));
}

#[test]
fn test_candidate_paths_end_with_yaml_name() {
    let paths = profile_candidate_paths("legacy");
    assert!(!paths.is_empty());
    assert!(paths.iter().all(|p| p.ends_with("legacy.yaml")));
}
