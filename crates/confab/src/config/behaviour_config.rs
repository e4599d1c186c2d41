use crate::config::default_notifications;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// One-shot flag: start a session the next time the app mounts.
    ///
    /// Consumed (read and cleared) exactly once per launch, whatever the
    /// outcome of the attempt it triggers.
    #[serde(default)]
    pub start_next_launch: bool,

    /// Whether to show desktop notifications.
    #[serde(default = "default_notifications")]
    pub notifications: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            start_next_launch: false,
            notifications: default_notifications(),
        }
    }
}
