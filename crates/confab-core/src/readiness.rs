use crate::{EngineResult, EngineSet, Provider, engine::SpeechEngine};

use std::sync::Arc;

use tracing::{debug, instrument, warn};

/// Stateless readiness queries against the currently configured provider.
///
/// Results are computed fresh on every call; model state can change between
/// activation attempts (a download finishing, the user switching providers),
/// so nothing here is cached.
///
/// Engine failures never escape: the coordinator's job is to decide what to
/// do about unreadiness, not to handle transport errors, so every failure
/// degrades to the conservative boolean.
pub struct ReadinessProber {
    engines: Arc<EngineSet>,
}

impl ReadinessProber {
    /// Create a prober over the given engines.
    pub fn new(engines: Arc<EngineSet>) -> Self {
        Self { engines }
    }

    /// Whether the provider can transcribe right now.
    ///
    /// Cloud providers have no local artifact to verify and are always
    /// ready. Local engines are initialized (idempotent) and then asked
    /// whether any usable model is on disk; any failure reads as `false`.
    #[instrument(skip(self))]
    pub async fn check_ready(&self, provider: &Provider) -> bool {
        let Some(engine) = self.engines.local(provider) else {
            return true;
        };

        match Self::probe_ready(engine).await {
            Ok(ready) => ready,
            Err(e) => {
                warn!(provider = %provider, error = %e, "Readiness probe failed, treating as not ready");
                false
            }
        }
    }

    /// Whether any of the provider's models is currently downloading.
    ///
    /// Fails open to `false`: a wrong "not downloading" routes the user to
    /// the actionable "please download" message rather than an indefinite
    /// "please wait".
    #[instrument(skip(self))]
    pub async fn check_downloading(&self, provider: &Provider) -> bool {
        let Some(engine) = self.engines.local(provider) else {
            return false;
        };

        match engine.available_models().await {
            Ok(models) => {
                let downloading = models.iter().any(|m| m.status.is_downloading());
                debug!(provider = %provider, downloading, "Download probe complete");
                downloading
            }
            Err(e) => {
                warn!(provider = %provider, error = %e, "Download probe failed, treating as not downloading");
                false
            }
        }
    }

    async fn probe_ready(engine: &Arc<dyn SpeechEngine>) -> EngineResult<bool> {
        engine.init().await?;
        engine.has_available_models().await
    }
}
