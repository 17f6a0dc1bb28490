use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ReconError;
use crate::model::ExtractOptions;

/// Burcat A., Ruscic B., 2006, as catalogued in the PrIMe bibliography.
pub const BURCAT_BIBLIOGRAPHY_ID: &str = "b00014727";

/// Sum-of-squares score above which a comparison is `Diverged`.
/// Not calibrated against measurement uncertainty.
pub const DEFAULT_THRESHOLD: f64 = 1e-3;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_bibliography")]
    pub reference_bibliography: String,
    #[serde(default = "default_true")]
    pub verify_column_labels: bool,
    #[serde(default)]
    pub paths: PathsConfig,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_bibliography() -> String {
    BURCAT_BIBLIOGRAPHY_ID.into()
}

fn default_true() -> bool {
    true
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            reference_bibliography: default_bibliography(),
            verify_column_labels: true,
            paths: PathsConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Input locations. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Local copy of BURCAT_THR.xml.
    #[serde(default = "default_bulk")]
    pub bulk: PathBuf,
    /// Root of the local PrIMe warehouse mirror.
    #[serde(default = "default_warehouse")]
    pub warehouse: PathBuf,
    /// Directory holding the persisted identifier index.
    #[serde(default = "default_cache")]
    pub cache: PathBuf,
}

fn default_bulk() -> PathBuf {
    PathBuf::from("BURCAT_THR.xml")
}

fn default_warehouse() -> PathBuf {
    PathBuf::from("warehouse.primekinetics.org")
}

fn default_cache() -> PathBuf {
    PathBuf::from("cache")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            bulk: default_bulk(),
            warehouse: default_warehouse(),
            cache: default_cache(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "threshold must be a finite, non-negative number, got {}",
                self.threshold
            )));
        }

        if self.reference_bibliography.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "reference_bibliography must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            verify_column_labels: self.verify_column_labels,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
