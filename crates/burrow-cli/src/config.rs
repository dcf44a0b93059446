//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//!
//! Command-line flags are layered on top later, when the api is built.

use crate::error::{Error, Result};
use burrow_core::{ConfigFragment, HttpTransportConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// ```yaml
/// default_profile: staging
/// profiles:
///   staging:
///     base_url: https://staging.example.com/api/
///     authentication:
///       scheme: bearer
///       token: ${ENV:STAGING_TOKEN}
/// transport:
///   timeout_secs: 10
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Profile used when `--profile` is not given
    pub default_profile: Option<String>,

    /// Named sets of declared defaults for the root node
    pub profiles: BTreeMap<String, ConfigFragment>,

    /// Settings for the HTTP transport
    pub transport: HttpTransportConfig,

    /// File this configuration was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;

        let mut config: Config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.source = Some(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            profiles = config.profiles.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to load config");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".burrow.yaml"), PathBuf::from(".burrow.json")];

        if let Some(config_dir) = dirs::config_dir() {
            let burrow_dir = config_dir.join("burrow");
            paths.push(burrow_dir.join("config.yaml"));
            paths.push(burrow_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".burrow.yaml"));
            paths.push(home_dir.join(".burrow.json"));
        }

        paths
    }

    /// The profile to build from
    ///
    /// An explicitly requested profile must exist, and so must the
    /// configured default. No request and no default means no profile.
    pub fn profile(&self, name: Option<&str>) -> Result<Option<&ConfigFragment>> {
        let Some(name) = name.or(self.default_profile.as_deref()) else {
            return Ok(None);
        };

        self.profiles
            .get(name)
            .map(Some)
            .ok_or_else(|| Error::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Profile names, sorted
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}
