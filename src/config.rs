//! Optional YAML configuration.
//!
//! Lookup order: an explicit `--config` path, then `codebase-compact.yaml` or
//! `.codebase-compact.yaml` in the target directory, then `config.yaml` in
//! the user config directory. With none present the defaults apply.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::DEFAULT_MAX_LISTED_CONSTANTS;

/// File names looked up in the target directory, in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["codebase-compact.yaml", ".codebase-compact.yaml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid excluded_paths pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Directory names skipped in addition to the built-in list.
    #[serde(default)]
    pub skip_directories: Vec<String>,
    /// Glob patterns matched against `/`-separated relative file paths.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub max_listed_constants: Option<usize>,
    #[serde(default)]
    pub signatures: Option<bool>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse_str(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Resolve and load the configuration for a run over `root`.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover(root),
        };

        let config = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::parse_file(&path)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that every glob compiles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.excluded_paths {
            globset::Glob::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Number of Python constants listed before `+N more` (defaults to 5).
    pub fn max_listed_constants(&self) -> usize {
        self.max_listed_constants
            .unwrap_or(DEFAULT_MAX_LISTED_CONSTANTS)
    }

    /// Whether to append signatures (defaults to false).
    pub fn signatures_enabled(&self) -> bool {
        self.signatures.unwrap_or(false)
    }
}

/// First config file found for `root`, falling back to the user config dir.
fn discover(root: &Path) -> Option<PathBuf> {
    PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| root.join(name))
        .chain(user_config_path())
        .find(|path| path.is_file())
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "codebase-compact")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}
