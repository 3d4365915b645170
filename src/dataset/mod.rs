//! Embedded iris dataset
//!
//! The 150 records ship inside the binary as CSV and are parsed with polars,
//! so training never depends on files outside the crate.

use crate::error::{ClassifierError, Result};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::Cursor;

const IRIS_CSV: &str = include_str!("iris.csv");

/// Feature columns, in the order every feature vector uses
pub const FEATURE_NAMES: [&str; 4] = ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Class names indexed by label
pub const CLASS_NAMES: [&str; 3] = ["setosa", "versicolor", "virginica"];

/// Name of the label column in the embedded CSV
pub const TARGET_COLUMN: &str = "species";

pub const N_FEATURES: usize = FEATURE_NAMES.len();
pub const N_CLASSES: usize = CLASS_NAMES.len();

/// Feature matrix with one integer label per row
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub targets: Array1<usize>,
}

impl Dataset {
    /// Create a dataset, checking that rows and labels line up
    pub fn new(features: Array2<f64>, targets: Array1<usize>) -> Result<Self> {
        if features.nrows() != targets.len() {
            return Err(ClassifierError::ShapeError {
                expected: format!("{} labels", features.nrows()),
                actual: format!("{} labels", targets.len()),
            });
        }
        Ok(Self { features, targets })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Rows at the given indices, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
        }
    }

    /// Shuffle with a seeded RNG and split off `ceil(test_size * n)` rows for testing.
    ///
    /// The permutation depends only on `n_samples` and `seed`, so the same seed
    /// always yields the same partitions.
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> Result<(Self, Self)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(ClassifierError::InvalidParameter {
                name: "test_size".to_string(),
                value: test_size.to_string(),
                reason: "must be in (0, 1)".to_string(),
            });
        }

        let n = self.n_samples();
        let n_test = (test_size * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(ClassifierError::DataError(format!(
                "cannot split {} samples with test_size {}",
                n, test_size
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);
        Ok((self.select(train_idx), self.select(test_idx)))
    }
}

/// Load the embedded iris dataset
pub fn load_iris() -> Result<Dataset> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(IRIS_CSV.as_bytes()))
        .finish()?;

    dataset_from_frame(&df)
}

/// Convert a frame holding the four feature columns and the label column
pub fn dataset_from_frame(df: &DataFrame) -> Result<Dataset> {
    let n_rows = df.height();
    let mut x_data = Vec::with_capacity(n_rows * N_FEATURES);

    for col_name in FEATURE_NAMES {
        x_data.extend(float_column(df, col_name)?);
    }

    // Column-major read, transposed into one row per sample
    let features = Array2::from_shape_vec((N_FEATURES, n_rows), x_data)
        .map_err(|e| ClassifierError::ShapeError {
            expected: format!("({}, {})", N_FEATURES, n_rows),
            actual: e.to_string(),
        })?
        .t()
        .to_owned();

    let labels = df
        .column(TARGET_COLUMN)
        .map_err(|_| ClassifierError::FeatureNotFound(TARGET_COLUMN.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Int64)?;

    let targets = labels
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(label) if (0..N_CLASSES as i64).contains(&label) => Ok(label as usize),
            Some(label) => Err(ClassifierError::DataError(format!(
                "row {}: label {} outside 0..{}",
                row, label, N_CLASSES
            ))),
            None => Err(ClassifierError::DataError(format!("row {}: missing label", row))),
        })
        .collect::<Result<Array1<usize>>>()?;

    Dataset::new(features, targets)
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df
        .column(name)
        .map_err(|_| ClassifierError::FeatureNotFound(name.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let values = series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                ClassifierError::DataError(format!("row {}: missing value in '{}'", row, name))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_iris_shape() {
        let data = load_iris().unwrap();
        assert_eq!(data.n_samples(), 150);
        assert_eq!(data.n_features(), 4);

        for class in 0..N_CLASSES {
            let count = data.targets.iter().filter(|&&t| t == class).count();
            assert_eq!(count, 50, "class {} should have 50 samples", class);
        }
    }

    #[test]
    fn test_first_record_is_setosa_exemplar() {
        let data = load_iris().unwrap();
        let row = data.features.row(0);
        assert_eq!(row.to_vec(), vec![5.1, 3.5, 1.4, 0.2]);
        assert_eq!(data.targets[0], 0);
    }

    #[test]
    fn test_all_measurements_non_negative() {
        let data = load_iris().unwrap();
        assert!(data.features.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_split_sizes() {
        let data = load_iris().unwrap();
        let (train, test) = data.train_test_split(0.2, 42).unwrap();
        assert_eq!(train.n_samples(), 120);
        assert_eq!(test.n_samples(), 30);
    }

    #[test]
    fn test_split_is_reproducible() {
        let data = load_iris().unwrap();
        let (train_a, test_a) = data.train_test_split(0.2, 42).unwrap();
        let (train_b, test_b) = data.train_test_split(0.2, 42).unwrap();
        assert_eq!(train_a.features, train_b.features);
        assert_eq!(test_a.targets, test_b.targets);

        let (_, test_c) = data.train_test_split(0.2, 7).unwrap();
        assert_ne!(test_a.features, test_c.features);
    }

    #[test]
    fn test_split_rejects_bad_ratio() {
        let data = load_iris().unwrap();
        assert!(data.train_test_split(0.0, 42).is_err());
        assert!(data.train_test_split(1.0, 42).is_err());
    }

    #[test]
    fn test_missing_label_column() {
        let df = df!(
            "sepal_length" => &[5.1],
            "sepal_width" => &[3.5],
            "petal_length" => &[1.4],
            "petal_width" => &[0.2]
        )
        .unwrap();
        let err = dataset_from_frame(&df).unwrap_err();
        assert!(matches!(err, ClassifierError::FeatureNotFound(_)));
    }
}
