//! Tuning configuration

use super::samplers::DEFAULT_N_ITER;
use crate::error::{DatathonError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for hyperparameter tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Number of candidates drawn by random (and bayesian) search
    pub n_iter: usize,

    /// Worker threads for candidate evaluation (0 = all cores)
    pub n_jobs: usize,

    /// Logging verbosity: 0 silent, 1 summary, 2 per candidate, 3 and above per fold
    pub verbose: u8,

    /// Seed for candidate sampling
    pub random_state: Option<u64>,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            n_iter: DEFAULT_N_ITER,
            n_jobs: 2,
            verbose: 0,
            random_state: None,
        }
    }
}

impl TuningConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the random-search budget
    pub fn with_n_iter(mut self, n: usize) -> Self {
        self.n_iter = n;
        self
    }

    /// Builder method to set the worker count
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = n;
        self
    }

    pub fn with_verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Builder method to set the sampling seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Parse a configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DatathonError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Reject settings random search cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.n_iter == 0 {
            return Err(DatathonError::InvalidParameter {
                name: "n_iter".to_string(),
                value: self.n_iter.to_string(),
                reason: "at least one candidate must be sampled".to_string(),
            });
        }
        Ok(())
    }
}
