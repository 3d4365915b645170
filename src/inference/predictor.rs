//! Single-sample predictor over a loaded model artifact

use crate::dataset::{CLASS_NAMES, N_CLASSES, N_FEATURES};
use crate::error::{ClassifierError, Result};
use crate::export::{load_model, ModelMetadata};
use crate::training::{argmax, Classifier, FittedModel};
use super::Sample;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of classifying one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class index
    pub prediction: usize,
    /// Name of the predicted class
    pub class_name: String,
    /// Probability of the predicted class
    pub confidence: f64,
    /// Probability per class, indexed by label
    pub probabilities: Vec<f64>,
}

/// Inference statistics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceStats {
    pub total_predictions: u64,
    pub error_count: u64,
    pub avg_latency_ms: f64,
}

/// Read-only model handle shared by all requests.
///
/// The model itself is never mutated after construction; only the call
/// counters change.
#[derive(Debug)]
pub struct Predictor {
    model: FittedModel,
    metadata: ModelMetadata,
    class_names: Vec<String>,
    total_predictions: AtomicU64,
    error_count: AtomicU64,
    total_latency_us: AtomicU64,
}

impl Predictor {
    /// Wrap an in-memory model, checking it has the iris schema
    pub fn new(model: FittedModel, metadata: ModelMetadata) -> Result<Self> {
        model.check_shape(N_FEATURES, N_CLASSES)?;
        if !metadata.class_names.is_empty() && metadata.class_names != CLASS_NAMES {
            return Err(ClassifierError::SerializationError(format!(
                "artifact classes {:?} do not match {:?}",
                metadata.class_names, CLASS_NAMES
            )));
        }

        Ok(Self {
            model,
            metadata,
            class_names: CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            total_predictions: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
        })
    }

    /// Load a model artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (model, metadata): (FittedModel, ModelMetadata) = load_model(path)?;
        let predictor = Self::new(model, metadata)?;
        info!(
            path = %path.display(),
            model_type = %predictor.metadata.model_type,
            trained_at = %predictor.metadata.trained_at,
            "Model loaded"
        );
        Ok(predictor)
    }

    /// Classify one validated sample
    pub fn predict(&self, sample: &Sample) -> Result<Prediction> {
        let start = Instant::now();
        self.total_predictions.fetch_add(1, Ordering::Relaxed);

        let result = self.predict_inner(sample);
        self.total_latency_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);

        if let Err(e) = &result {
            self.error_count.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "Prediction failed");
        }
        result
    }

    fn predict_inner(&self, sample: &Sample) -> Result<Prediction> {
        let proba = self.model.predict_proba(&sample.to_row())?;
        let row = proba.row(0);

        if row.iter().any(|p| !p.is_finite()) {
            return Err(ClassifierError::InferenceError(
                "model produced non-finite probabilities".to_string(),
            ));
        }

        let label = argmax(row);
        let class_name = self
            .class_names
            .get(label)
            .cloned()
            .ok_or_else(|| ClassifierError::InferenceError(format!("unknown class index {}", label)))?;

        debug!(prediction = label, class_name = %class_name, "Sample classified");
        Ok(Prediction {
            prediction: label,
            class_name,
            confidence: row[label],
            probabilities: row.to_vec(),
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Number of model invocations so far
    pub fn prediction_count(&self) -> u64 {
        self.total_predictions.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> InferenceStats {
        let total = self.total_predictions.load(Ordering::Relaxed);
        let latency_us = self.total_latency_us.load(Ordering::Relaxed);
        InferenceStats {
            total_predictions: total,
            error_count: self.error_count.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                latency_us as f64 / total as f64 / 1000.0
            } else {
                0.0
            },
        }
    }
}
