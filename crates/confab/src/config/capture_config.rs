use serde::{Deserialize, Serialize};

/// Capture device configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Microphone device id (None = system default).
    #[serde(default)]
    pub microphone: Option<String>,

    /// System-audio device id (None = system default).
    #[serde(default)]
    pub system_audio: Option<String>,
}
