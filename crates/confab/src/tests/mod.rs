mod coordinator;
mod hotkey;
mod transcript;

use crate::{
    AppError, AppResult, Notifier, SessionBackend, SessionCoordinator, SessionEvent,
    TranscriptState, backend::SessionHandle, config::Config, session_events::event_bus,
};

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use confab_core::{
    EngineResult, EngineSet, ModelInfo, ModelStatus, ReadinessProber, SpeechEngine,
};
use error_location::ErrorLocation;
use tokio::sync::{Mutex, broadcast};

/// Scriptable recording-service backend.
pub(crate) struct MockBackend {
    /// `Some(reason)` makes every start fail with that reason.
    pub(crate) fail_with: Option<String>,
    /// Artificial latency before the start resolves.
    pub(crate) delay: Duration,
    pub(crate) start_calls: AtomicUsize,
    pub(crate) stop_calls: AtomicUsize,
}

impl MockBackend {
    pub(crate) fn ok() -> Self {
        Self {
            fail_with: None,
            delay: Duration::from_millis(20),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::ok()
        }
    }
}

#[async_trait]
impl SessionBackend for MockBackend {
    async fn start(
        &self,
        _mic_device_id: Option<&str>,
        _system_device_id: Option<&str>,
        _title: &str,
    ) -> AppResult<SessionHandle> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        match &self.fail_with {
            Some(reason) => Err(AppError::Backend {
                reason: reason.clone(),
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(SessionHandle {
                id: "session-1".to_string(),
            }),
        }
    }

    async fn stop(&self, _session_id: &str) -> AppResult<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Minimal engine whose readiness and download state are fixed up front.
pub(crate) struct FixedEngine {
    pub(crate) has_models: bool,
    pub(crate) downloading: bool,
}

#[async_trait]
impl SpeechEngine for FixedEngine {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn init(&self) -> EngineResult<()> {
        Ok(())
    }

    async fn has_available_models(&self) -> EngineResult<bool> {
        Ok(self.has_models)
    }

    async fn available_models(&self) -> EngineResult<Vec<ModelInfo>> {
        let status = if self.downloading {
            ModelStatus::Downloading { progress: 25 }
        } else if self.has_models {
            ModelStatus::Available
        } else {
            ModelStatus::Missing
        };

        Ok(vec![ModelInfo {
            name: "fixture".to_string(),
            path: std::path::PathBuf::from("fixture"),
            size_mb: 1,
            status,
            description: String::new(),
        }])
    }

    async fn download_model(&self, _name: &str) -> EngineResult<()> {
        Ok(())
    }
}

/// Everything a coordinator test needs to observe.
pub(crate) struct Harness {
    pub(crate) coordinator: Arc<SessionCoordinator>,
    pub(crate) backend: Arc<MockBackend>,
    pub(crate) transcript: Arc<TranscriptState>,
    pub(crate) events: broadcast::Sender<SessionEvent>,
}

/// Build a coordinator over mocks. The default provider (parakeet) routes
/// to a `FixedEngine` with the given readiness/download state.
pub(crate) fn harness(backend: MockBackend, ready: bool, downloading: bool) -> Harness {
    let engine = Arc::new(FixedEngine {
        has_models: ready,
        downloading,
    });
    let engines = Arc::new(EngineSet::from_engines(
        engine.clone(),
        engine.clone(),
        engine,
    ));

    let backend = Arc::new(backend);
    let transcript = Arc::new(TranscriptState::new());
    let events = event_bus();
    let config = Arc::new(Mutex::new(Config::default()));

    let coordinator = Arc::new(SessionCoordinator::new(
        backend.clone(),
        ReadinessProber::new(engines),
        Arc::clone(&transcript),
        config,
        Notifier::new(false),
        events.clone(),
    ));

    Harness {
        coordinator,
        backend,
        transcript,
        events,
    }
}
