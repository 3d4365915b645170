//! Inference module
//!
//! Validates prediction requests and runs them through a loaded model
//! artifact.

mod predictor;
mod validation;

pub use predictor::{InferenceStats, Prediction, Predictor};
pub use validation::{validate_request, FieldViolation, Sample, ViolationKind};
