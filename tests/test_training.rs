//! Integration test: Training pipeline end-to-end

use iris_classifier::dataset::{load_iris, CLASS_NAMES};
use iris_classifier::error::ClassifierError;
use iris_classifier::export::{load_model, ModelMetadata};
use iris_classifier::inference::{Predictor, Sample};
use iris_classifier::training::{
    train_and_save, Classifier, FittedModel, TrainEngine, TrainingConfig, MODEL_TYPE,
};

#[test]
fn test_train_writes_loadable_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");

    let model = train_and_save(&path).unwrap();
    assert!(path.exists());

    let (loaded, metadata): (FittedModel, ModelMetadata) = load_model(&path).unwrap();
    assert_eq!(metadata.model_type, MODEL_TYPE);
    assert_eq!(metadata.class_names, CLASS_NAMES);
    assert_eq!(loaded.classifier.coefficients, model.classifier.coefficients);
    assert_eq!(loaded.classifier.intercepts, model.classifier.intercepts);
}

#[test]
fn test_loaded_artifact_reproduces_test_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");

    let mut engine = TrainEngine::new(TrainingConfig::new(&path));
    engine.train_and_save().unwrap();
    let test_set = engine.test_set().unwrap();
    let expected = engine.test_predictions().unwrap();

    let predictor = Predictor::load(&path).unwrap();
    assert_eq!(predictor.metadata().model_type, MODEL_TYPE);
    assert!(predictor.metadata().metrics.contains_key("accuracy"));
    for (row, &label) in test_set.features.rows().into_iter().zip(expected.iter()) {
        let sample = Sample::new(row[0], row[1], row[2], row[3]).unwrap();
        assert_eq!(predictor.predict(&sample).unwrap().prediction, label);
    }
    assert_eq!(predictor.prediction_count(), test_set.n_samples() as u64);
}

#[test]
fn test_held_out_accuracy() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = TrainEngine::new(TrainingConfig::new(dir.path().join("model.bin")));
    engine.fit(&load_iris().unwrap()).unwrap();

    let report = engine.report().unwrap();
    assert_eq!(report.n_samples, 30);
    assert!(report.accuracy >= 0.9, "accuracy {}", report.accuracy);

    let text = report.to_string();
    for name in CLASS_NAMES {
        assert!(text.contains(name));
    }
    assert!(text.contains("macro avg"));
}

#[test]
fn test_retraining_overwrites_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    std::fs::write(&path, b"not a model").unwrap();

    train_and_save(&path).unwrap();
    assert!(Predictor::load(&path).is_ok());
}

#[test]
fn test_same_seed_same_model() {
    let dir = tempfile::tempdir().unwrap();
    let a = train_and_save(dir.path().join("a.bin")).unwrap();
    let b = train_and_save(dir.path().join("b.bin")).unwrap();

    let data = load_iris().unwrap();
    assert_eq!(a.predict(&data.features).unwrap(), b.predict(&data.features).unwrap());
    assert_eq!(a.predict_proba(&data.features).unwrap(), b.predict_proba(&data.features).unwrap());
}

#[test]
fn test_unwritable_output_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing_dir").join("model.bin");
    let err = train_and_save(&path).unwrap_err();
    assert!(matches!(err, ClassifierError::IoError(_)));
}

#[test]
fn test_corrupt_artifact_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    train_and_save(&path).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 20;
    bytes[last] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    assert!(Predictor::load(&path).is_err());
}
