//! Scaler + classifier bundle persisted as the model artifact

use crate::error::{ClassifierError, Result};
use crate::preprocessing::StandardScaler;
use super::linear_models::LogisticRegression;
use super::models::Classifier;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Everything inference needs: feature standardization and the fitted
/// coefficients. Raw measurements go in, class probabilities come out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    pub scaler: StandardScaler,
    pub classifier: LogisticRegression,
}

impl FittedModel {
    /// Fit the scaler on `x`, then fit `classifier` on the scaled features
    pub fn fit(x: &Array2<f64>, y: &Array1<usize>, mut classifier: LogisticRegression) -> Result<Self> {
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(x)?;
        classifier.fit(&scaled, y)?;
        Ok(Self { scaler, classifier })
    }

    pub fn n_features(&self) -> Option<usize> {
        self.classifier.n_features()
    }

    pub fn n_classes(&self) -> Option<usize> {
        self.classifier.n_classes()
    }

    /// Check that a deserialized model matches the expected schema
    pub fn check_shape(&self, n_features: usize, n_classes: usize) -> Result<()> {
        if !self.classifier.is_fitted || !self.scaler.is_fitted() {
            return Err(ClassifierError::ModelNotFitted);
        }
        let actual = (self.n_features(), self.n_classes(), self.scaler.n_features());
        if actual != (Some(n_features), Some(n_classes), Some(n_features)) {
            return Err(ClassifierError::ShapeError {
                expected: format!("{} features, {} classes", n_features, n_classes),
                actual: format!(
                    "{:?} features, {:?} classes, scaler over {:?}",
                    actual.0, actual.1, actual.2
                ),
            });
        }
        Ok(())
    }
}

impl Classifier for FittedModel {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let scaled = self.scaler.transform(x)?;
        self.classifier.predict_proba(&scaled)
    }
}
