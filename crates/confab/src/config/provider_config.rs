use confab_core::Provider;
use serde::{Deserialize, Serialize};

/// Transcription provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The configured provider (local engine name or a cloud provider id).
    #[serde(default)]
    pub engine: Provider,
}
