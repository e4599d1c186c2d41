use crate::hotkey::{DEFAULT_HOTKEY, HotkeyDescriptor};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Push-to-talk hotkey configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Persisted canonical descriptor string, e.g. `fn+space`.
    #[serde(default = "default_binding")]
    pub binding: String,
}

fn default_binding() -> String {
    DEFAULT_HOTKEY.to_string()
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            binding: default_binding(),
        }
    }
}

impl HotkeyConfig {
    /// Reconcile the persisted binding with the compiled-in default.
    ///
    /// An unparseable persisted string falls back to the default rather
    /// than leaving the app without a hotkey.
    pub fn descriptor(&self) -> HotkeyDescriptor {
        match self.binding.parse() {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(
                    binding = %self.binding,
                    error = %e,
                    "Persisted hotkey invalid, falling back to default"
                );
                HotkeyDescriptor::default()
            }
        }
    }
}
