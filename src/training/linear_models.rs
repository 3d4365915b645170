//! Multinomial logistic regression

use crate::error::{ClassifierError, Result};
use super::models::Classifier;
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sufficient decrease constant for the backtracking line search
const ARMIJO_C: f64 = 1e-4;
/// Smallest step the line search will try before giving up on the iteration
const MIN_STEP: f64 = 1e-10;

/// Factor a symmetric positive-definite matrix as L * L^T.
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Some(l)
}

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Retries once with a small ridge on the diagonal if the matrix is near-singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let l = match cholesky_factor(a) {
        Some(l) => l,
        None => {
            let mut a_reg = a.clone();
            let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
            for k in 0..n {
                a_reg[[k, k]] += ridge;
            }
            cholesky_factor(&a_reg)?
        }
    };

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Row-wise softmax, shifted by the row maximum for stability
pub(crate) fn softmax_rows(logits: &mut Array2<f64>) {
    for mut row in logits.rows_mut() {
        let max = row.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
}

/// Logistic regression for multi-class classification (softmax / multinomial)
///
/// Minimizes the mean cross-entropy plus `1 / (2 * C * n) * ||theta||^2` with a
/// damped Newton method. The penalty covers the intercepts as well, which keeps
/// the Hessian positive definite despite the softmax's shift invariance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients, one row per class
    pub coefficients: Option<Array2<f64>>,
    /// Fitted intercept per class
    pub intercepts: Option<Array1<f64>>,
    /// Inverse regularization strength
    pub c: f64,
    /// Maximum Newton iterations
    pub max_iter: usize,
    /// Convergence tolerance on the largest absolute gradient entry
    pub tol: f64,
    /// Iterations used by the last fit
    pub n_iter: usize,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercepts: None,
            c: 1.0,
            max_iter: 200,
            tol: 1e-4,
            n_iter: 0,
            is_fitted: false,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn n_classes(&self) -> Option<usize> {
        self.intercepts.as_ref().map(|b| b.len())
    }

    pub fn n_features(&self) -> Option<usize> {
        self.coefficients.as_ref().map(|w| w.ncols())
    }

    /// Fit the model. Labels must be `0..n_classes`; the class count is the
    /// largest label plus one.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(ClassifierError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ClassifierError::TrainingError("no training samples".to_string()));
        }
        if !(self.c > 0.0) {
            return Err(ClassifierError::InvalidParameter {
                name: "c".to_string(),
                value: self.c.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let n_classes = y.iter().max().map(|m| m + 1).unwrap_or(0);
        if n_classes < 2 {
            return Err(ClassifierError::TrainingError(
                "need at least two classes".to_string(),
            ));
        }

        // Augment with a bias column so intercepts live in the last parameter column
        let n_params = n_features + 1;
        let mut xa = Array2::ones((n_samples, n_params));
        xa.slice_mut(s![.., ..n_features]).assign(x);

        let mut onehot = Array2::<f64>::zeros((n_samples, n_classes));
        for (i, &label) in y.iter().enumerate() {
            onehot[[i, label]] = 1.0;
        }

        let lambda = 1.0 / (self.c * n_samples as f64);
        let mut theta = Array2::<f64>::zeros((n_classes, n_params));
        let (mut loss, mut probs) = Self::objective(&xa, &onehot, &theta, lambda)?;

        let mut converged = false;
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            let grad = (&probs - &onehot).t().dot(&xa) / n_samples as f64 + lambda * &theta;
            let grad_max = grad.iter().fold(0.0f64, |a, &g| a.max(g.abs()));
            if grad_max < self.tol {
                converged = true;
                break;
            }
            iterations = iter + 1;

            let hessian = Self::hessian(&xa, &probs, lambda);
            let grad_flat = Array1::from_iter(grad.iter().copied());
            let direction = cholesky_solve(&hessian, &grad_flat).ok_or_else(|| {
                ClassifierError::ComputationError("Newton system is not positive definite".to_string())
            })?;
            let direction = direction.into_shape_with_order((n_classes, n_params))?;
            let decrease = grad_flat.dot(&Array1::from_iter(direction.iter().copied()));

            // Backtracking line search on the full Newton step
            let mut step = 1.0;
            let mut accepted = None;
            while step >= MIN_STEP {
                let candidate = &theta - &(step * &direction);
                let (cand_loss, cand_probs) = Self::objective(&xa, &onehot, &candidate, lambda)?;
                if cand_loss <= loss - ARMIJO_C * step * decrease {
                    accepted = Some((candidate, cand_loss, cand_probs));
                    break;
                }
                step *= 0.5;
            }

            match accepted {
                Some((candidate, cand_loss, cand_probs)) => {
                    debug!(iteration = iterations, loss = cand_loss, step, grad_max, "Newton step");
                    theta = candidate;
                    loss = cand_loss;
                    probs = cand_probs;
                }
                None => {
                    debug!(iteration = iterations, grad_max, "Line search stalled");
                    break;
                }
            }
        }

        if !converged {
            // The loop may have stalled or run out; one last gradient check decides
            let grad = (&probs - &onehot).t().dot(&xa) / n_samples as f64 + lambda * &theta;
            converged = grad.iter().all(|g| g.abs() < self.tol);
        }
        if !converged {
            return Err(ClassifierError::ConvergenceError { iterations });
        }

        self.coefficients = Some(theta.slice(s![.., ..n_features]).to_owned());
        self.intercepts = Some(theta.column(n_features).to_owned());
        self.n_iter = iterations;
        self.is_fitted = true;

        Ok(self)
    }

    /// Mean cross-entropy plus L2 penalty, and the class probabilities it was computed from
    fn objective(
        xa: &Array2<f64>,
        onehot: &Array2<f64>,
        theta: &Array2<f64>,
        lambda: f64,
    ) -> Result<(f64, Array2<f64>)> {
        let mut probs = xa.dot(&theta.t());
        softmax_rows(&mut probs);

        let n = xa.nrows() as f64;
        let data_loss = -(onehot * &probs.mapv(|p| p.max(f64::MIN_POSITIVE).ln())).sum() / n;
        let loss = data_loss + 0.5 * lambda * theta.mapv(|v| v * v).sum();

        if !loss.is_finite() {
            return Err(ClassifierError::ComputationError(format!(
                "objective is not finite ({})",
                loss
            )));
        }
        Ok((loss, probs))
    }

    /// Hessian of the objective over the row-major flattened parameters
    fn hessian(xa: &Array2<f64>, probs: &Array2<f64>, lambda: f64) -> Array2<f64> {
        let (n_samples, n_params) = xa.dim();
        let n_classes = probs.ncols();
        let dim = n_classes * n_params;
        let mut h = Array2::<f64>::zeros((dim, dim));

        for i in 0..n_samples {
            let row = xa.row(i);
            for k in 0..n_classes {
                for l in 0..n_classes {
                    let delta = if k == l { 1.0 } else { 0.0 };
                    let w = probs[[i, k]] * (delta - probs[[i, l]]);
                    if w == 0.0 {
                        continue;
                    }
                    for a in 0..n_params {
                        let wa = w * row[a];
                        for b in 0..n_params {
                            h[[k * n_params + a, l * n_params + b]] += wa * row[b];
                        }
                    }
                }
            }
        }

        h /= n_samples as f64;
        for d in 0..dim {
            h[[d, d]] += lambda;
        }
        h
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<usize>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        let correct = y_pred.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        Ok(correct as f64 / y.len() as f64)
    }
}

impl Classifier for LogisticRegression {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(ClassifierError::ModelNotFitted);
        }
        let (coefficients, intercepts) = match (&self.coefficients, &self.intercepts) {
            (Some(w), Some(b)) => (w, b),
            _ => return Err(ClassifierError::ModelNotFitted),
        };
        if x.ncols() != coefficients.ncols() {
            return Err(ClassifierError::ShapeError {
                expected: format!("{} features", coefficients.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut logits = x.dot(&coefficients.t()) + intercepts;
        softmax_rows(&mut logits);
        Ok(logits)
    }
}

/// Index of the largest entry; the first one wins on ties
pub fn argmax(values: ndarray::ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Apply `argmax` to every row
pub fn argmax_rows(proba: &Array2<f64>) -> Array1<usize> {
    proba.axis_iter(Axis(0)).map(argmax).collect()
}
