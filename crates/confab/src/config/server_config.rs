use crate::config::{default_backend_url, default_port};

use serde::{Deserialize, Serialize};

/// Control server and recording service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port for the embedded control/settings server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the local recording service.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            backend_url: default_backend_url(),
        }
    }
}
