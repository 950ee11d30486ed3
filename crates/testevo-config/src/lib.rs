//! Run configuration for an evolution analysis.
//!
//! A run is described by one TOML file naming exactly one version
//! source (a folder of snapshot directories, or a git repository), the
//! output files per statistic, and the smell thresholds.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LONG_TEST_THRESHOLD: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("no version source configured, add a [folder] or [git] section")]
    MissingSource,
    #[error("both [folder] and [git] configured, keep exactly one")]
    ConflictingSources,
    #[error("no output configured, add at least one [output] entry")]
    NoOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EvolutionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub smells: SmellsConfig,
}

/// A directory whose sorted subdirectories are consecutive versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderConfig {
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    pub repository: PathBuf,
    /// Subdirectory holding the snapshot files; repository root when
    /// absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_commits: Option<usize>,
    /// Unix timestamps bounding the walked commit range, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_commits: Vec<String>,
}

/// Output file per statistic; absent entries disable that statistic and
/// every stage that only feeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smells: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_changes: Option<PathBuf>,
}

impl OutputConfig {
    pub fn is_empty(&self) -> bool {
        self.projects.is_none()
            && self.tests.is_none()
            && self.smells.is_none()
            && self.variable_changes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmellsConfig {
    #[serde(default = "default_long_test_threshold")]
    pub long_test_threshold: usize,
}

impl Default for SmellsConfig {
    fn default() -> Self {
        Self {
            long_test_threshold: default_long_test_threshold(),
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<EvolutionConfig, ConfigError> {
    let raw = fs::read_to_string(path.as_ref())?;
    let parsed: EvolutionConfig = toml::from_str(&raw)?;
    validate_config(normalize_config(parsed))
}

fn default_long_test_threshold() -> usize {
    DEFAULT_LONG_TEST_THRESHOLD
}

fn normalize_optional(input: Option<String>) -> Option<String> {
    input
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn normalize_config(mut config: EvolutionConfig) -> EvolutionConfig {
    if let Some(git) = config.git.as_mut() {
        git.suite_dir = normalize_optional(git.suite_dir.take());
        git.ignore_commits = git
            .ignore_commits
            .drain(..)
            .map(|commit| commit.trim().to_owned())
            .filter(|commit| !commit.is_empty())
            .collect();
    }
    config
}

fn validate_config(config: EvolutionConfig) -> Result<EvolutionConfig, ConfigError> {
    match (&config.folder, &config.git) {
        (None, None) => return Err(ConfigError::MissingSource),
        (Some(_), Some(_)) => return Err(ConfigError::ConflictingSources),
        _ => {}
    }
    if config.output.is_empty() {
        return Err(ConfigError::NoOutput);
    }
    Ok(config)
}
