//! Model training module
//!
//! Fits a multinomial logistic regression on standardized features, evaluates
//! it on a seeded held-out split and writes the result as a model artifact.

mod config;
mod engine;
mod models;
mod pipeline;
pub mod linear_models;

pub use config::{TrainingConfig, DEFAULT_MODEL_PATH};
pub use engine::{train_and_save, TrainEngine, MODEL_TYPE};
pub use linear_models::{argmax, argmax_rows, LogisticRegression};
pub use models::{ClassMetrics, ClassificationReport, Classifier};
pub use pipeline::FittedModel;
