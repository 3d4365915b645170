//! Application state management

use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::error::Result;
use crate::inference::Predictor;

use super::ServerConfig;

/// Application state shared across handlers.
///
/// The model slot is written at most once, before the listener is bound, and
/// only read afterwards.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    model: OnceLock<Arc<Predictor>>,
}

impl AppState {
    /// State with no model loaded yet
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            model: OnceLock::new(),
        }
    }

    /// State with an already constructed predictor
    pub fn with_predictor(config: ServerConfig, predictor: Predictor) -> Self {
        let state = Self::new(config);
        // Freshly created cell, cannot already be set
        let _ = state.model.set(Arc::new(predictor));
        state
    }

    /// Load the artifact at `config.model_path`.
    ///
    /// A second call after a successful load is a no-op.
    pub fn load_model(&self) -> Result<()> {
        if self.is_ready() {
            warn!("Model already loaded, ignoring reload request");
            return Ok(());
        }

        info!(path = %self.config.model_path.display(), "Loading model artifact");
        let predictor = Predictor::load(&self.config.model_path)?;
        if self.model.set(Arc::new(predictor)).is_err() {
            warn!("Model was loaded concurrently, keeping the first one");
        }
        Ok(())
    }

    /// Loaded predictor, if any
    pub fn predictor(&self) -> Option<Arc<Predictor>> {
        self.model.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.model.get().is_some()
    }
}
