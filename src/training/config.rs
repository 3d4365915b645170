//! Training configuration

use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "model.bin";

/// Configuration for model training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of the dataset held out for evaluation
    pub test_size: f64,

    /// Random seed for the train/test shuffle
    pub random_state: u64,

    /// Maximum optimizer iterations
    pub max_iter: usize,

    /// Inverse L2 regularization strength
    pub c: f64,

    /// Convergence tolerance on the gradient
    pub tol: f64,

    /// Where the fitted artifact is written
    pub output_path: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            max_iter: 200,
            c: 1.0,
            tol: 1e-4,
            output_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl TrainingConfig {
    /// Create a configuration writing the artifact to `output_path`
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set the iteration bound
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Builder method to set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Builder method to set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Reject values the fit cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &str, value: String, reason: &str| ClassifierError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
        };

        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(invalid("test_size", self.test_size.to_string(), "must be in (0, 1)"));
        }
        if self.max_iter == 0 {
            return Err(invalid("max_iter", "0".to_string(), "must be at least 1"));
        }
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(invalid("c", self.c.to_string(), "must be positive and finite"));
        }
        if !(self.tol > 0.0) {
            return Err(invalid("tol", self.tol.to_string(), "must be positive"));
        }
        Ok(())
    }
}
