use serde::{Deserialize, Serialize};

/// Identity of the configured transcription provider.
///
/// Three engines run locally and gate session starts on a downloaded model;
/// anything else is a hosted provider with no local artifact to verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// Local parakeet engine.
    Parakeet,
    /// Local multilingual GGUF engine.
    Multilingual,
    /// Local whisper engine (GGML models).
    LocalWhisper,
    /// Hosted provider, identified by name (e.g. "openai").
    #[serde(untagged)]
    Cloud(String),
}

impl Provider {
    /// Whether this provider needs a local model on disk before it can run.
    pub fn is_local(&self) -> bool {
        !matches!(self, Provider::Cloud(_))
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Parakeet => write!(f, "parakeet"),
            Provider::Multilingual => write!(f, "multilingual"),
            Provider::LocalWhisper => write!(f, "local-whisper"),
            Provider::Cloud(name) => write!(f, "{name}"),
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Provider::Parakeet
    }
}
