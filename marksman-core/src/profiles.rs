// File: marksman-core/src/profiles.rs

//! profiles.rs - Named grading profiles for marksman.
//!
//! A profile is a named, reusable set of policy overrides (for example the
//! keyword-heavy `legacy` weighting). Profiles are looked up by file path,
//! then in the candidate profile directories, then among the profiles
//! embedded in the library.
//!
//! license: MIT OR Apache-2.0

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{GradingConfig, PolicyOverrides};

/// Profiles that ship with the library, available without any file on disk.
pub const BUILTIN_PROFILES: &[(&str, &str)] = &[
    ("lenient", include_str!("../config/profiles/lenient.yaml")),
    ("legacy", include_str!("../config/profiles/legacy.yaml")),
];

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "snake_case", default)]
pub struct ProfileConfig {
    pub profile_name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub version: String,
    pub policy: PolicyOverrides,
    #[serde(flatten, skip_serializing)]
    pub unknown: BTreeMap<String, serde_yml::Value>,
}

impl ProfileConfig {
    /// A profile must be named and versioned, and must produce a valid
    /// configuration when applied to the defaults.
    pub fn validate(&self, base: &GradingConfig) -> Result<()> {
        if self.profile_name.trim().is_empty() {
            bail!("Profile validation failed: 'profile_name' field cannot be empty.");
        }
        if self.version.trim().is_empty() {
            bail!("Profile '{}' validation failed: 'version' field cannot be empty.", self.profile_name);
        }
        for key in self.unknown.keys() {
            warn!("Profile '{}': unknown key '{}' will be ignored.", self.profile_name, key);
        }

        apply_profile_to_config(self, base.clone())
            .validate()
            .with_context(|| format!("Profile '{}' validation failed", self.profile_name))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub profile_name: String,
    pub display_name: Option<String>,
    pub version: String,
    pub description: Option<String>,
    /// `None` for built-in profiles.
    pub path: Option<PathBuf>,
}

fn profile_dirs() -> Vec<PathBuf> {
    vec![
        dirs::home_dir().map(|p| p.join(".marksman").join("profiles")),
        dirs::config_dir().map(|p| p.join("marksman").join("profiles")),
        Some(PathBuf::from("/etc/marksman/profiles")),
        Some(PathBuf::from("./config/profiles")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn profile_candidate_paths(name: &str) -> Vec<PathBuf> {
    profile_dirs()
        .into_iter()
        .map(|dir| dir.join(format!("{}.yaml", name)))
        .collect()
}

fn builtin_profile(name: &str) -> Option<&'static str> {
    BUILTIN_PROFILES
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, yaml)| *yaml)
}

pub fn load_profile_by_name(name_or_path: &str) -> Result<ProfileConfig> {
    debug!("Attempting to load profile from: '{}'", name_or_path);

    let path = Path::new(name_or_path);
    let on_disk = if path.is_file() {
        debug!("Input is a valid file path. Loading directly from: {}", path.display());
        Some(path.to_path_buf())
    } else {
        profile_candidate_paths(name_or_path).into_iter().find(|p| p.is_file())
    };

    let cfg: ProfileConfig = match on_disk {
        Some(path_to_load) => {
            let raw = fs::read_to_string(&path_to_load)
                .with_context(|| format!("reading profile file {}", path_to_load.display()))?;
            serde_yml::from_str(&raw).with_context(|| format!("parsing profile YAML {}", path_to_load.display()))?
        }
        None => {
            let yaml = builtin_profile(name_or_path).with_context(|| {
                format!(
                    "Profile '{}' not found. It is not a valid file path, and was not found in expected locations.",
                    name_or_path
                )
            })?;
            debug!("Using built-in profile '{}'.", name_or_path);
            serde_yml::from_str(yaml).with_context(|| format!("parsing built-in profile '{}'", name_or_path))?
        }
    };

    cfg.validate(&GradingConfig::load_default()?)?;
    debug!("Successfully loaded profile '{}'.", cfg.profile_name);
    Ok(cfg)
}

pub fn apply_profile_to_config(profile: &ProfileConfig, mut config: GradingConfig) -> GradingConfig {
    debug!("Applying profile '{}' to grading policy.", profile.profile_name);
    profile.policy.apply_to(&mut config.policy);
    config
}

/// Lists profiles found in the candidate directories, followed by the
/// built-in profiles that no file on disk shadows.
pub fn list_available_profiles() -> Vec<ProfileSummary> {
    let mut out = Vec::new();
    let mut seen_paths: HashSet<PathBuf> = HashSet::new();

    for dir in profile_dirs() {
        let Ok(entries) = fs::read_dir(&dir) else {
            debug!("Candidate profile directory not found: {}", dir.display());
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("yaml") || !seen_paths.insert(path.clone()) {
                continue;
            }
            debug!("Found potential profile at: {}", path.display());
            match fs::read_to_string(&path) {
                Ok(s) => match serde_yml::from_str::<ProfileConfig>(&s) {
                    Ok(cfg) => out.push(summarize(cfg, Some(path))),
                    Err(_) => warn!("Failed to parse YAML for profile at: {}", path.display()),
                },
                Err(e) => warn!("Failed to read profile file at '{}': {}", path.display(), e),
            }
        }
    }

    for (name, yaml) in BUILTIN_PROFILES {
        if out.iter().any(|p| p.profile_name == *name) {
            continue;
        }
        match serde_yml::from_str::<ProfileConfig>(yaml) {
            Ok(cfg) => out.push(summarize(cfg, None)),
            Err(e) => warn!("Built-in profile '{}' failed to parse: {}", name, e),
        }
    }
    out
}

fn summarize(cfg: ProfileConfig, path: Option<PathBuf>) -> ProfileSummary {
    ProfileSummary {
        profile_name: cfg.profile_name,
        display_name: cfg.display_name,
        version: cfg.version,
        description: cfg.description,
        path,
    }
}
