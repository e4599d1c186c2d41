mod local;
mod set;

pub use {
    local::{LocalModelEngine, ModelFormat},
    set::EngineSet,
};

use async_trait::async_trait;

use crate::{EngineResult, ModelInfo};

/// Surface of a local transcription engine as seen by the coordinator.
///
/// Implementations must make `init` idempotent: the readiness prober calls
/// it at the start of every probe, before every model query.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Stable engine name, used in routes and logs.
    fn name(&self) -> &str;

    /// Prepare the engine for model queries. Safe to call repeatedly.
    async fn init(&self) -> EngineResult<()>;

    /// Whether at least one usable model is on disk.
    async fn has_available_models(&self) -> EngineResult<bool>;

    /// The engine's model catalog with current per-model status.
    async fn available_models(&self) -> EngineResult<Vec<ModelInfo>>;

    /// Fetch a catalog model into the models directory.
    ///
    /// Progress is reflected in `available_models` output while in flight.
    async fn download_model(&self, name: &str) -> EngineResult<()>;
}
