//! Configuration loading
//!
//! Kharcha reads two TOML documents: the category rule set
//! (`categories.toml`, see [`crate::rules`]) and the analysis thresholds
//! (`analysis.toml`, this module).
//!
//! ## Configuration Resolution
//!
//! Each document is resolved with the same layering:
//! 1. An explicit path passed by the caller (must exist)
//! 2. An override in the data dir (~/.local/share/kharcha/config/<file>)
//! 3. The embedded default compiled into the binary

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::budget::BudgetConfig;
use crate::detect::DetectionConfig;
use crate::error::{Error, Result};
use crate::insights::{RecommendationConfig, MAX_LIMIT, MIN_LIMIT};
use crate::patterns::PatternConfig;

/// Embedded default analysis thresholds
const DEFAULT_ANALYSIS_CONFIG: &str = include_str!("../../../config/analysis.toml");

pub const ANALYSIS_CONFIG_FILE: &str = "analysis.toml";
pub const CATEGORIES_CONFIG_FILE: &str = "categories.toml";
pub const MEMORY_SNAPSHOT_FILE: &str = "memory.json";

/// Where a configuration document was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Compiled into the binary
    Embedded,
    /// Read from disk
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Embedded => write!(f, "embedded defaults"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Kharcha's data directory (~/.local/share/kharcha on Linux)
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("kharcha"))
}

/// Default override path for a config file
pub fn default_config_path(file_name: &str) -> Option<PathBuf> {
    data_dir().map(|d| d.join("config").join(file_name))
}

/// Default location of the merchant memory snapshot
pub fn default_memory_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join(MEMORY_SNAPSHOT_FILE))
}

/// Resolve a config document to its text and source
pub(crate) fn resolve_document(
    explicit: Option<&Path>,
    file_name: &str,
    embedded: &'static str,
) -> Result<(String, ConfigSource)> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        return Ok((content, ConfigSource::File(path.to_path_buf())));
    }

    if let Some(default_path) = default_config_path(file_name) {
        if default_path.exists() {
            let content = fs::read_to_string(&default_path).map_err(|e| {
                Error::Config(format!(
                    "Failed to read config {}: {}",
                    default_path.display(),
                    e
                ))
            })?;
            return Ok((content, ConfigSource::File(default_path)));
        }
    }

    Ok((embedded.to_string(), ConfigSource::Embedded))
}

/// All analysis thresholds
///
/// Every section and key is optional in TOML; missing values keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub detection: DetectionConfig,
    pub patterns: PatternConfig,
    pub recommendations: RecommendationConfig,
    pub budgets: BudgetConfig,
}

impl AnalysisConfig {
    /// Load thresholds (explicit path, then data dir override, then embedded)
    pub fn load(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let (content, source) =
            resolve_document(path, ANALYSIS_CONFIG_FILE, DEFAULT_ANALYSIS_CONFIG)?;
        let config = Self::parse(&content)?;
        debug!(source = %source, "Loaded analysis config");
        Ok((config, source))
    }

    /// Parse thresholds from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let limit = self.recommendations.limit;
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(Error::Config(format!(
                "recommendations.limit must be between {} and {}",
                MIN_LIMIT, MAX_LIMIT
            )));
        }
        if self.detection.min_samples == 0 {
            return Err(Error::Config(
                "detection.min_samples must be at least 1".to_string(),
            ));
        }
        if self.patterns.recent_window == 0 {
            return Err(Error::Config(
                "patterns.recent_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let config = AnalysisConfig::parse(DEFAULT_ANALYSIS_CONFIG).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = AnalysisConfig::parse(
            r#"
            [detection]
            min_samples = 8

            [recommendations]
            limit = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.detection.min_samples, 8);
        assert_eq!(
            config.detection.z_threshold,
            DetectionConfig::default().z_threshold
        );
        assert_eq!(config.recommendations.limit, 4);
        assert_eq!(config.patterns, PatternConfig::default());
    }

    #[test]
    fn test_limit_out_of_range_rejected() {
        let err = AnalysisConfig::parse("[recommendations]\nlimit = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(AnalysisConfig::parse("[recommendations]\nlimit = 9\n").is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = AnalysisConfig::parse("[detection\nmin_samples = 3").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_explicit_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        fs::write(&path, "[patterns]\nrecent_window = 5\n").unwrap();

        let (config, source) = AnalysisConfig::load(Some(&path)).unwrap();
        assert_eq!(config.patterns.recent_window, 5);
        assert_eq!(source, ConfigSource::File(path));
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(AnalysisConfig::load(Some(&path)).is_err());
    }
}
