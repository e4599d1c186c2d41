
use crate::{EngineError, EngineResult, ModelInfo, SpeechEngine};

use std::panic::Location;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use error_location::ErrorLocation;

/// Scriptable engine for prober tests: each query can succeed or fail.
pub(crate) struct MockEngine {
    pub(crate) has_models: bool,
    pub(crate) models: Vec<ModelInfo>,
    pub(crate) fail_init: bool,
    pub(crate) fail_queries: bool,
    pub(crate) init_calls: AtomicUsize,
}

impl MockEngine {
    pub(crate) fn ready() -> Self {
        Self {
            has_models: true,
            models: Vec::new(),
            fail_init: false,
            fail_queries: false,
            init_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            has_models: false,
            ..Self::ready()
        }
    }

    pub(crate) fn broken() -> Self {
        Self {
            fail_queries: true,
            ..Self::ready()
        }
    }

    pub(crate) fn with_models(models: Vec<ModelInfo>) -> Self {
        Self {
            models,
            ..Self::empty()
        }
    }

    fn failure(&self) -> EngineError {
        EngineError::ModelsDirUnavailable {
            path: std::path::PathBuf::from("/nonexistent"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

#[async_trait]
impl SpeechEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn init(&self) -> EngineResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(self.failure());
        }
        Ok(())
    }

    async fn has_available_models(&self) -> EngineResult<bool> {
        if self.fail_queries {
            return Err(self.failure());
        }
        Ok(self.has_models)
    }

    async fn available_models(&self) -> EngineResult<Vec<ModelInfo>> {
        if self.fail_queries {
            return Err(self.failure());
        }
        Ok(self.models.clone())
    }

    async fn download_model(&self, name: &str) -> EngineResult<()> {
        Err(EngineError::UnknownModel {
            name: name.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
