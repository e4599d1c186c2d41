use crate::{AppError, AppResult};

use std::panic::Location;

use async_trait::async_trait;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Handle to a session acknowledged by the recording service.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Service-assigned session id.
    pub id: String,
}

/// The recording service's session surface, consumed by the coordinator.
///
/// `start` may take arbitrary time and may fail; the coordinator imposes no
/// timeout on it. A `None` device id means "use the system default".
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Ask the service to start a session with the given capture devices
    /// and title.
    async fn start(
        &self,
        mic_device_id: Option<&str>,
        system_device_id: Option<&str>,
        title: &str,
    ) -> AppResult<SessionHandle>;

    /// Ask the service to stop a session. Best-effort.
    async fn stop(&self, session_id: &str) -> AppResult<()>;
}

#[derive(Serialize)]
struct StartSessionRequest<'a> {
    mic_device_id: Option<&'a str>,
    system_device_id: Option<&'a str>,
    title: &'a str,
}

#[derive(Deserialize)]
struct StartSessionResponse {
    id: String,
}

/// HTTP client for the local recording service.
pub struct HttpSessionBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionBackend {
    /// Create a client for the service at `base_url`
    /// (e.g. `http://127.0.0.1:5167`).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[track_caller]
    fn request_error(context: &str, e: &reqwest::Error) -> AppError {
        AppError::Backend {
            reason: format!("{context}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

#[async_trait]
impl SessionBackend for HttpSessionBackend {
    #[instrument(skip(self))]
    async fn start(
        &self,
        mic_device_id: Option<&str>,
        system_device_id: Option<&str>,
        title: &str,
    ) -> AppResult<SessionHandle> {
        let url = format!("{}/api/sessions", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&StartSessionRequest {
                mic_device_id,
                system_device_id,
                title,
            })
            .send()
            .await
            .map_err(|e| Self::request_error("start request failed", &e))?;

        if !response.status().is_success() {
            return Err(AppError::Backend {
                reason: format!("recording service returned {}", response.status()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let body: StartSessionResponse = response
            .json()
            .await
            .map_err(|e| Self::request_error("malformed start response", &e))?;

        debug!(session_id = %body.id, "Recording service accepted session");

        Ok(SessionHandle { id: body.id })
    }

    #[instrument(skip(self))]
    async fn stop(&self, session_id: &str) -> AppResult<()> {
        let url = format!("{}/api/sessions/{}/stop", self.base_url, session_id);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| Self::request_error("stop request failed", &e))?;

        if !response.status().is_success() {
            return Err(AppError::Backend {
                reason: format!("recording service returned {}", response.status()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}
