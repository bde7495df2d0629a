//! Pipeline configuration
//!
//! Holds the initial category vocabulary, the keyword table used to assign
//! categories, and the statement detection threshold.
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path (CLI `--config`)
//! 2. An override in the config dir (~/.config/tally/config.toml)
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{CategoryVocabulary, DEFAULT_CATEGORY};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/tally.toml");

fn default_min_signature_fraction() -> f64 {
    0.75
}

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub categories: CategoriesConfig,
}

/// Statement format detection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Minimum fraction of a layout's expected columns present in a header
    #[serde(default = "default_min_signature_fraction")]
    pub min_signature_fraction: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_signature_fraction: default_min_signature_fraction(),
        }
    }
}

/// Category vocabulary and keyword rules
#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesConfig {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub rules: Vec<CategoryRule>,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            names: vec![DEFAULT_CATEGORY.to_string()],
            rules: Vec::new(),
        }
    }
}

/// Assigns `category` to descriptions containing any of `keywords`
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
    /// Only applies to credits (e.g. salary)
    #[serde(default)]
    pub credit_only: bool,
}

impl TallyConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: TallyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// The configuration compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Load configuration (explicit path, then override file, then embedded)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config {}: {}", path.display(), e))
            })?;
            debug!("Loaded config from {}", path.display());
            return Self::from_toml(&content);
        }

        if let Some(default_path) = default_config_path() {
            if default_path.exists() {
                let content = fs::read_to_string(&default_path).map_err(|e| {
                    Error::Config(format!(
                        "Failed to read config {}: {}",
                        default_path.display(),
                        e
                    ))
                })?;
                debug!("Loaded config override from {}", default_path.display());
                return Self::from_toml(&content);
            }
        }

        Self::embedded()
    }

    /// Check value ranges and that every rule targets a known category
    pub fn validate(&self) -> Result<()> {
        let fraction = self.detection.min_signature_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(Error::Config(format!(
                "detection.min_signature_fraction must be in (0, 1], got {}",
                fraction
            )));
        }

        let vocab = self.vocabulary();
        for rule in &self.categories.rules {
            if !vocab.contains(&rule.category) {
                return Err(Error::Config(format!(
                    "Rule targets unknown category '{}'",
                    rule.category
                )));
            }
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "Rule for '{}' has no keywords",
                    rule.category
                )));
            }
        }

        Ok(())
    }

    /// The initial category vocabulary described by this config
    pub fn vocabulary(&self) -> CategoryVocabulary {
        CategoryVocabulary::new(&self.categories.names)
    }
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self::embedded().unwrap_or_else(|_| Self {
            detection: DetectionConfig::default(),
            categories: CategoriesConfig::default(),
        })
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tally").join("config.toml"))
}
