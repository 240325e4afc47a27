//! Engine configuration.
//!
//! Loaded from JSON; every field has a default so partial documents are accepted.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Allow rayon for per-curve stages.
    pub parallel: bool,
    /// Minimum number of curves before work is spread over the thread pool.
    pub parallel_threshold: usize,
    /// Compare the dirty and clean totals after redistribution.
    pub verify_conservation: bool,
    /// Relative tolerance for the conservation check, scaled by `max(1, Σ|dirty entry|)`.
    pub conservation_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 8,
            verify_conservation: true,
            conservation_tolerance: 1e-9,
        }
    }
}

impl EngineConfig {
    /// Single-threaded configuration, mostly useful for debugging.
    pub fn sequential() -> Self {
        Self { parallel: false, ..Self::default() }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.conservation_tolerance.is_finite() || self.conservation_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "conservation_tolerance must be finite and non-negative, got {}",
                self.conservation_tolerance
            )));
        }
        Ok(())
    }

    /// Whether a stage over `curves` items should run on the thread pool.
    #[inline]
    pub fn use_parallel(&self, curves: usize) -> bool {
        self.parallel && curves >= self.parallel_threshold.max(1)
    }
}
