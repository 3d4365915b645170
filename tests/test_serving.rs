//! Integration test: model lifecycle at service startup

use iris_classifier::inference::Predictor;
use iris_classifier::server::{run_server, AppState, ServerConfig};
use iris_classifier::training::train_and_save;

fn config_for(path: std::path::PathBuf) -> ServerConfig {
    ServerConfig::default()
        .with_host("127.0.0.1")
        .with_port(0)
        .with_model_path(path)
}

#[test]
fn test_state_starts_unloaded() {
    let state = AppState::new(config_for("model.bin".into()));
    assert!(!state.is_ready());
    assert!(state.predictor().is_none());
}

#[test]
fn test_load_missing_artifact_fails() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(config_for(dir.path().join("absent.bin")));
    assert!(state.load_model().is_err());
    assert!(!state.is_ready());
}

#[test]
fn test_load_garbage_artifact_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    std::fs::write(&path, b"definitely not a model").unwrap();

    let state = AppState::new(config_for(path));
    assert!(state.load_model().is_err());
    assert!(!state.is_ready());
}

#[test]
fn test_load_is_write_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    train_and_save(&path).unwrap();

    let state = AppState::new(config_for(path.clone()));
    state.load_model().unwrap();
    let first = state.predictor().unwrap();

    // Artifact disappears; a second load keeps the model already in place
    std::fs::remove_file(&path).unwrap();
    state.load_model().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &state.predictor().unwrap()));
}

#[test]
fn test_state_from_prebuilt_predictor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    train_and_save(&path).unwrap();

    let predictor = Predictor::load(&path).unwrap();
    let state = AppState::with_predictor(config_for(path), predictor);
    assert!(state.is_ready());
    assert_eq!(state.predictor().unwrap().class_names().len(), 3);
}

#[tokio::test]
async fn test_server_refuses_to_start_without_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_server(config_for(dir.path().join("absent.bin"))).await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("failed to load model"));
}
