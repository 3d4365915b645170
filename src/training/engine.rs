//! Training engine implementation

use crate::dataset::{self, Dataset, CLASS_NAMES, FEATURE_NAMES};
use crate::error::{ClassifierError, Result};
use crate::export::{save_model, ModelMetadata};
use super::linear_models::LogisticRegression;
use super::models::{ClassificationReport, Classifier};
use super::pipeline::FittedModel;
use super::TrainingConfig;
use ndarray::Array1;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Model type recorded in artifact metadata
pub const MODEL_TYPE: &str = "multinomial_logistic_regression";

/// Main training engine: split, fit, evaluate, persist
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
    model: Option<FittedModel>,
    report: Option<ClassificationReport>,
    test_set: Option<Dataset>,
    test_predictions: Option<Array1<usize>>,
    training_time_secs: f64,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            model: None,
            report: None,
            test_set: None,
            test_predictions: None,
            training_time_secs: 0.0,
        }
    }

    /// Split `data`, fit on the training part and evaluate on the held-out part
    pub fn fit(&mut self, data: &Dataset) -> Result<&FittedModel> {
        self.config.validate()?;
        let start = Instant::now();

        let (train, test) = data.train_test_split(self.config.test_size, self.config.random_state)?;
        info!(
            train_samples = train.n_samples(),
            test_samples = test.n_samples(),
            seed = self.config.random_state,
            "Split dataset"
        );

        info!(max_iter = self.config.max_iter, c = self.config.c, "Training logistic regression");
        let classifier = LogisticRegression::new()
            .with_c(self.config.c)
            .with_max_iter(self.config.max_iter)
            .with_tol(self.config.tol);
        let model = FittedModel::fit(&train.features, &train.targets, classifier)?;

        let y_pred = model.predict(&test.features)?;
        let report = ClassificationReport::compute(&test.targets, &y_pred, &CLASS_NAMES)?;

        self.training_time_secs = start.elapsed().as_secs_f64();
        info!(
            accuracy = report.accuracy,
            macro_f1 = report.macro_avg.f1_score,
            iterations = model.classifier.n_iter,
            training_time_secs = self.training_time_secs,
            "Model evaluated on held-out set"
        );
        info!("Classification report:\n{}", report);

        self.report = Some(report);
        self.test_set = Some(test);
        self.test_predictions = Some(y_pred);
        Ok(self.model.insert(model))
    }

    /// Train on the embedded iris dataset and write the artifact to the configured path
    pub fn train_and_save(&mut self) -> Result<FittedModel> {
        info!("Loading iris dataset");
        let data = dataset::load_iris()?;
        let model = self.fit(&data)?.clone();

        let output_path = self.config.output_path.clone();
        self.save(&output_path)?;
        Ok(model)
    }

    /// Write the fitted model to `path`, overwriting any existing artifact
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let model = self.model.as_ref().ok_or(ClassifierError::ModelNotFitted)?;
        save_model(model, path, self.metadata())
    }

    /// Metadata describing the current fit
    pub fn metadata(&self) -> ModelMetadata {
        let mut metadata = ModelMetadata::new("iris")
            .with_model_type(MODEL_TYPE)
            .with_features(&FEATURE_NAMES)
            .with_classes(&CLASS_NAMES)
            .add_hyperparameter("c", self.config.c)
            .add_hyperparameter("max_iter", self.config.max_iter)
            .add_hyperparameter("tol", self.config.tol)
            .add_hyperparameter("test_size", self.config.test_size)
            .add_hyperparameter("random_state", self.config.random_state);

        if let Some(report) = &self.report {
            metadata = metadata
                .add_metric("accuracy", report.accuracy)
                .add_metric("macro_precision", report.macro_avg.precision)
                .add_metric("macro_recall", report.macro_avg.recall)
                .add_metric("macro_f1", report.macro_avg.f1_score);
        }
        metadata
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&FittedModel> {
        self.model.as_ref()
    }

    /// Held-out evaluation from the last fit
    pub fn report(&self) -> Option<&ClassificationReport> {
        self.report.as_ref()
    }

    pub fn test_set(&self) -> Option<&Dataset> {
        self.test_set.as_ref()
    }

    /// Labels the fitted model assigned to the held-out set
    pub fn test_predictions(&self) -> Option<&Array1<usize>> {
        self.test_predictions.as_ref()
    }

    pub fn training_time_secs(&self) -> f64 {
        self.training_time_secs
    }
}

/// Train with default settings and write the artifact to `output_path`
pub fn train_and_save(output_path: impl AsRef<Path>) -> Result<FittedModel> {
    let config = TrainingConfig::new(output_path.as_ref());
    TrainEngine::new(config).train_and_save()
}
