//! Classifier trait and evaluation metrics

use crate::error::{ClassifierError, Result};
use super::linear_models::argmax_rows;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for probabilistic classifiers
pub trait Classifier: Send + Sync {
    /// Class probabilities, one row per sample and one column per class
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Most probable class per row (lowest index on ties)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }
}

/// Precision, recall and F1 for one class (or an average over classes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Held-out evaluation of a classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub class_names: Vec<String>,
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub n_samples: usize,
}

impl ClassificationReport {
    /// Compute accuracy and per-class metrics. Undefined ratios (no predicted
    /// or no true members of a class) count as 0.
    pub fn compute(
        y_true: &Array1<usize>,
        y_pred: &Array1<usize>,
        class_names: &[&str],
    ) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(ClassifierError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(ClassifierError::DataError(
                "cannot evaluate on an empty set".to_string(),
            ));
        }

        let n_classes = class_names.len();
        let mut tp = vec![0usize; n_classes];
        let mut fp = vec![0usize; n_classes];
        let mut fn_ = vec![0usize; n_classes];

        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            if t >= n_classes || p >= n_classes {
                return Err(ClassifierError::DataError(format!(
                    "label outside 0..{}: true {}, predicted {}",
                    n_classes, t, p
                )));
            }
            if t == p {
                tp[t] += 1;
            } else {
                fp[p] += 1;
                fn_[t] += 1;
            }
        }

        let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };

        let per_class: Vec<ClassMetrics> = (0..n_classes)
            .map(|c| {
                let precision = ratio(tp[c], tp[c] + fp[c]);
                let recall = ratio(tp[c], tp[c] + fn_[c]);
                let f1_score = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    precision,
                    recall,
                    f1_score,
                    support: tp[c] + fn_[c],
                }
            })
            .collect();

        let n_samples = y_true.len();
        let correct: usize = tp.iter().sum();

        let macro_avg = Self::average(&per_class, |_| 1.0 / n_classes as f64, n_samples);
        let weighted_avg =
            Self::average(&per_class, |m| m.support as f64 / n_samples as f64, n_samples);

        Ok(Self {
            class_names: class_names.iter().map(|s| s.to_string()).collect(),
            per_class,
            accuracy: correct as f64 / n_samples as f64,
            macro_avg,
            weighted_avg,
            n_samples,
        })
    }

    fn average(
        per_class: &[ClassMetrics],
        weight: impl Fn(&ClassMetrics) -> f64,
        support: usize,
    ) -> ClassMetrics {
        let mut avg = ClassMetrics {
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            support,
        };
        for m in per_class {
            let w = weight(m);
            avg.precision += w * m.precision;
            avg.recall += w * m.recall;
            avg.f1_score += w * m.f1_score;
        }
        avg
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .class_names
            .iter()
            .map(|n| n.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, m) in self.class_names.iter().zip(&self.per_class) {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.n_samples
        )?;
        for (label, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const NAMES: [&str; 3] = ["a", "b", "c"];

    #[test]
    fn test_classification_metrics() {
        let y_true = array![0, 0, 1, 1, 2, 2];
        let y_pred = array![0, 1, 1, 1, 2, 0];

        let report = ClassificationReport::compute(&y_true, &y_pred, &NAMES).unwrap();

        assert!((report.accuracy - 4.0 / 6.0).abs() < 1e-12);
        // class b: tp=2, fp=1, fn=0
        assert!((report.per_class[1].precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.per_class[1].recall - 1.0).abs() < 1e-12);
        assert_eq!(report.per_class[1].support, 2);
        assert_eq!(report.weighted_avg.support, 6);
    }

    #[test]
    fn test_perfect_predictions() {
        let y = array![0, 1, 2, 2];
        let report = ClassificationReport::compute(&y, &y, &NAMES).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.macro_avg.f1_score, 1.0);
    }

    #[test]
    fn test_absent_class_scores_zero() {
        let y_true = array![0, 0, 1];
        let y_pred = array![0, 0, 1];
        let report = ClassificationReport::compute(&y_true, &y_pred, &NAMES).unwrap();
        assert_eq!(report.per_class[2].precision, 0.0);
        assert_eq!(report.per_class[2].support, 0);
    }

    #[test]
    fn test_length_mismatch() {
        let err = ClassificationReport::compute(&array![0, 1], &array![0], &NAMES).unwrap_err();
        assert!(matches!(err, ClassifierError::ShapeError { .. }));
    }

    #[test]
    fn test_report_display_lists_every_class() {
        let y = array![0, 1, 2];
        let report = ClassificationReport::compute(&y, &y, &NAMES).unwrap();
        let text = report.to_string();
        for line in ["precision", "accuracy", "macro avg", "weighted avg"] {
            assert!(text.contains(line), "missing '{}' in\n{}", line, text);
        }
    }
}
