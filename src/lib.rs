//! Iris classifier - training and serving for a multinomial logistic regression
//!
//! # Modules
//!
//! - [`dataset`] - Embedded iris dataset and seeded train/test split
//! - [`preprocessing`] - Feature standardization
//! - [`training`] - Model fitting, evaluation and artifact writing
//! - [`export`] - Model artifact format
//! - [`inference`] - Request validation and single-sample prediction
//! - [`server`] - HTTP prediction service
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod dataset;
pub mod preprocessing;
pub mod training;
pub mod inference;
pub mod export;

// Services
pub mod server;
pub mod cli;

pub use error::{ClassifierError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ClassifierError, Result};

    // Data
    pub use crate::dataset::{load_iris, Dataset, CLASS_NAMES, FEATURE_NAMES};

    // Training
    pub use crate::training::{
        train_and_save, ClassificationReport, Classifier, FittedModel, LogisticRegression,
        TrainEngine, TrainingConfig,
    };

    // Inference
    pub use crate::inference::{validate_request, Prediction, Predictor, Sample};

    // Export
    pub use crate::export::{load_model, save_model, ModelMetadata};

    // Server
    pub use crate::server::{create_router, run_server, AppState, ServerConfig};
}
