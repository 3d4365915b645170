//! Model artifact serialization
//!
//! An artifact is a bincode-encoded envelope: magic bytes, format version,
//! metadata, the bincode-encoded model, and an FNV-1a checksum over the model
//! bytes. Loading verifies all three before decoding the model.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ClassifierError, Result};

/// Model metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,
    /// Version of the crate that wrote the artifact
    pub version: String,
    /// Training timestamp (RFC 3339)
    pub trained_at: String,
    /// Model type
    pub model_type: String,
    /// Feature names, in input order
    pub feature_names: Vec<String>,
    /// Class names, indexed by label
    pub class_names: Vec<String>,
    /// Hyperparameters
    pub hyperparameters: BTreeMap<String, String>,
    /// Held-out evaluation metrics
    pub metrics: BTreeMap<String, f64>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: "model".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            trained_at: chrono::Utc::now().to_rfc3339(),
            model_type: "unknown".to_string(),
            feature_names: Vec::new(),
            class_names: Vec::new(),
            hyperparameters: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }
}

impl ModelMetadata {
    /// Create new metadata with name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set model type
    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = model_type.into();
        self
    }

    /// Set feature names
    pub fn with_features<S: ToString>(mut self, features: &[S]) -> Self {
        self.feature_names = features.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set class names
    pub fn with_classes<S: ToString>(mut self, classes: &[S]) -> Self {
        self.class_names = classes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add hyperparameter
    pub fn add_hyperparameter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.hyperparameters.insert(key.into(), value.to_string());
        self
    }

    /// Add metric
    pub fn add_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }
}

/// Serializable model wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedModel {
    /// Magic bytes for format detection
    pub magic: [u8; 4],
    /// Format version
    pub format_version: u32,
    /// Model metadata
    pub metadata: ModelMetadata,
    /// Serialized model data
    pub model_data: Vec<u8>,
    /// Checksum for integrity verification
    pub checksum: u64,
}

impl SerializedModel {
    /// Magic bytes for iris model files
    pub const MAGIC: [u8; 4] = *b"IRIS";
    /// Current format version
    pub const VERSION: u32 = 1;

    /// Create new serialized model
    pub fn new(metadata: ModelMetadata, model_data: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(&model_data);
        Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            metadata,
            model_data,
            checksum,
        }
    }

    /// Compute checksum using FNV-1a hash
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    /// Verify checksum
    pub fn verify_checksum(&self) -> bool {
        Self::compute_checksum(&self.model_data) == self.checksum
    }

    /// Check magic, version and checksum
    pub fn verify(&self) -> Result<()> {
        if self.magic != Self::MAGIC {
            return Err(ClassifierError::SerializationError(
                "not a model artifact (bad magic bytes)".to_string(),
            ));
        }
        if self.format_version != Self::VERSION {
            return Err(ClassifierError::SerializationError(format!(
                "unsupported artifact format version {} (expected {})",
                self.format_version,
                Self::VERSION
            )));
        }
        if !self.verify_checksum() {
            return Err(ClassifierError::SerializationError(
                "Checksum verification failed - file may be corrupted".to_string(),
            ));
        }
        Ok(())
    }
}

/// Encode a model and its metadata into artifact bytes
pub fn to_artifact_bytes<M: Serialize>(model: &M, metadata: ModelMetadata) -> Result<Vec<u8>> {
    let model_data = bincode::serialize(model)
        .map_err(|e| ClassifierError::SerializationError(format!("Failed to serialize: {}", e)))?;
    let serialized = SerializedModel::new(metadata, model_data);
    Ok(bincode::serialize(&serialized)?)
}

/// Decode artifact bytes produced by [`to_artifact_bytes`]
pub fn from_artifact_bytes<M: DeserializeOwned>(bytes: &[u8]) -> Result<(M, ModelMetadata)> {
    let serialized: SerializedModel = bincode::deserialize(bytes).map_err(|e| {
        ClassifierError::SerializationError(format!("Failed to decode artifact: {}", e))
    })?;
    serialized.verify()?;

    let model: M = bincode::deserialize(&serialized.model_data).map_err(|e| {
        ClassifierError::SerializationError(format!("Failed to deserialize model: {}", e))
    })?;

    Ok((model, serialized.metadata))
}

/// Save a serializable model to file, replacing any existing file
pub fn save_model<M: Serialize>(
    model: &M,
    path: impl AsRef<Path>,
    metadata: ModelMetadata,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_artifact_bytes(model, metadata)?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;

    info!(path = %path.display(), bytes = bytes.len(), "Model artifact written");
    Ok(())
}

/// Load a model from file
pub fn load_model<M: DeserializeOwned>(path: impl AsRef<Path>) -> Result<(M, ModelMetadata)> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read model artifact");

    from_artifact_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestModel {
        weights: Vec<f64>,
        bias: f64,
    }

    fn test_model() -> TestModel {
        TestModel {
            weights: vec![1.0, 2.0, 3.0],
            bias: 0.5,
        }
    }

    #[test]
    fn test_serialized_model_checksum() {
        let data = vec![1, 2, 3, 4, 5];
        let serialized = SerializedModel::new(ModelMetadata::new("test"), data);

        assert!(serialized.verify_checksum());
        assert!(serialized.verify().is_ok());
    }

    #[test]
    fn test_serialized_model_checksum_failure() {
        let data = vec![1, 2, 3, 4, 5];
        let mut serialized = SerializedModel::new(ModelMetadata::new("test"), data);

        // Corrupt the data
        serialized.model_data[0] = 99;

        assert!(!serialized.verify_checksum());
        assert!(serialized.verify().is_err());
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut serialized = SerializedModel::new(ModelMetadata::new("test"), vec![1]);
        serialized.magic = *b"NOPE";
        let err = serialized.verify().unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_metadata_builder() {
        let metadata = ModelMetadata::new("my_model")
            .with_model_type("logistic_regression")
            .with_features(&["x1", "x2"])
            .with_classes(&["a", "b", "c"])
            .add_hyperparameter("max_iter", 200)
            .add_metric("accuracy", 0.97);

        assert_eq!(metadata.name, "my_model");
        assert_eq!(metadata.model_type, "logistic_regression");
        assert_eq!(metadata.feature_names.len(), 2);
        assert_eq!(metadata.class_names.len(), 3);
        assert_eq!(metadata.hyperparameters.get("max_iter"), Some(&"200".to_string()));
        assert_eq!(metadata.metrics.get("accuracy"), Some(&0.97));
    }

    #[test]
    fn test_artifact_bytes_round_trip() {
        let metadata = ModelMetadata::new("test").add_metric("accuracy", 1.0);
        let bytes = to_artifact_bytes(&test_model(), metadata.clone()).unwrap();
        let (restored, restored_meta): (TestModel, _) = from_artifact_bytes(&bytes).unwrap();

        assert_eq!(restored, test_model());
        assert_eq!(restored_meta, metadata);
    }

    #[test]
    fn test_truncated_artifact_rejected() {
        let bytes = to_artifact_bytes(&test_model(), ModelMetadata::new("test")).unwrap();
        let result: Result<(TestModel, _)> = from_artifact_bytes(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(ClassifierError::SerializationError(_))));
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        std::fs::write(&path, b"stale contents").unwrap();

        save_model(&test_model(), &path, ModelMetadata::new("test")).unwrap();
        let (restored, _): (TestModel, _) = load_model(&path).unwrap();
        assert_eq!(restored, test_model());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<(TestModel, _)> = load_model(dir.path().join("absent.bin"));
        assert!(matches!(result, Err(ClassifierError::IoError(_))));
    }
}
