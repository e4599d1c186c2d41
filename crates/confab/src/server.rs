//! Embedded HTTP control surface.
//!
//! Serves the settings/status API on localhost: session status, the
//! broadcast direct-start entry point, webhooks from the recording service
//! (started confirmation, transcript segments), model listings/downloads,
//! and hotkey updates (string or raw captured key event).

use crate::{
    AppError, AppResult, SessionCoordinator, SessionEvent, SessionStatus, TranscriptState,
    TranscriptSnapshot, config::Config,
    hotkey::{HotkeyDescriptor, HotkeyNormalizer, RawKeyEvent},
};

use std::{net::SocketAddr, panic::Location, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use confab_core::{EngineSet, ModelInfo};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{info, instrument, warn};

/// Shared state for the control server handlers.
pub struct ServerState {
    /// Session coordinator, for status reads.
    pub coordinator: Arc<SessionCoordinator>,
    /// Local engines, for model listings and downloads.
    pub engines: Arc<EngineSet>,
    /// Transcript state, for snapshots and segment webhooks.
    pub transcript: Arc<TranscriptState>,
    /// Shared configuration, for hotkey updates.
    pub config: Arc<Mutex<Config>>,
    /// Session event bus, for direct-start and started events.
    pub events: broadcast::Sender<SessionEvent>,
    /// Normalizer for raw captured key events.
    pub normalizer: HotkeyNormalizer,
}

/// Serve the control API until the shutdown signal fires.
#[instrument(skip(state, shutdown_rx))]
pub async fn serve(
    state: Arc<ServerState>,
    port: u16,
    mut shutdown_rx: watch::Receiver<bool>,
) -> AppResult<()> {
    let router = router(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::ServerError {
            reason: format!("failed to bind {addr}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(%addr, "Control server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await
        .map_err(|e| AppError::ServerError {
            reason: format!("serve failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/session/start", post(direct_start))
        .route("/api/session/started", post(session_started))
        .route("/api/models", get(models))
        .route("/api/models/{engine}/{model}/download", post(download_model))
        .route("/api/transcript", get(transcript))
        .route("/api/transcript/segments", post(append_segment))
        .route("/api/settings/hotkey", put(update_hotkey))
        .with_state(state)
}

async fn status(State(state): State<Arc<ServerState>>) -> Json<SessionStatus> {
    Json(state.coordinator.status())
}

async fn direct_start(State(state): State<Arc<ServerState>>) -> StatusCode {
    // The request only raises the broadcast event; admission is decided by
    // the coordinator's guard like every other trigger.
    let _ = state.events.send(SessionEvent::DirectStartRequested);
    StatusCode::ACCEPTED
}

#[derive(Deserialize)]
struct StartedWebhook {
    session_id: String,
}

async fn session_started(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<StartedWebhook>,
) -> StatusCode {
    let _ = state.events.send(SessionEvent::Started {
        session_id: body.session_id,
    });
    StatusCode::NO_CONTENT
}

#[derive(Serialize)]
struct EngineModels {
    engine: String,
    models: Vec<ModelInfo>,
}

async fn models(State(state): State<Arc<ServerState>>) -> Json<Vec<EngineModels>> {
    let mut listings = Vec::new();

    for engine in state.engines.all() {
        let models = match engine.init().await {
            Ok(()) => match engine.available_models().await {
                Ok(models) => models,
                Err(e) => {
                    warn!(engine = engine.name(), error = %e, "Model listing failed");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(engine = engine.name(), error = %e, "Engine init failed");
                Vec::new()
            }
        };

        listings.push(EngineModels {
            engine: engine.name().to_string(),
            models,
        });
    }

    Json(listings)
}

async fn download_model(
    State(state): State<Arc<ServerState>>,
    Path((engine, model)): Path<(String, String)>,
) -> StatusCode {
    let Some(engine) = state.engines.by_name(&engine) else {
        return StatusCode::NOT_FOUND;
    };

    let engine = Arc::clone(engine);
    tokio::spawn(async move {
        // Failures are reflected in the model listing and logged by the
        // engine itself.
        let _ = engine.download_model(&model).await;
    });

    StatusCode::ACCEPTED
}

async fn transcript(State(state): State<Arc<ServerState>>) -> Json<TranscriptSnapshot> {
    Json(state.transcript.snapshot())
}

#[derive(Deserialize)]
struct SegmentWebhook {
    text: String,
}

async fn append_segment(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<SegmentWebhook>,
) -> StatusCode {
    state.transcript.append(body.text);
    StatusCode::NO_CONTENT
}

/// Hotkey update: either an explicit descriptor string or a raw key event
/// captured by the settings page.
#[derive(Deserialize)]
struct HotkeyUpdate {
    #[serde(default)]
    binding: Option<String>,
    #[serde(default)]
    captured: Option<RawKeyEvent>,
}

#[derive(Serialize)]
struct HotkeyResponse {
    binding: String,
}

async fn update_hotkey(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<HotkeyUpdate>,
) -> Result<Json<HotkeyResponse>, (StatusCode, String)> {
    let descriptor: HotkeyDescriptor = match (body.binding, body.captured) {
        (Some(binding), _) => binding
            .parse()
            .map_err(|e: AppError| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?,
        (None, Some(event)) => state.normalizer.normalize(&event).ok_or((
            StatusCode::UNPROCESSABLE_ENTITY,
            "key event does not form a valid hotkey".to_string(),
        ))?,
        (None, None) => {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "provide either 'binding' or 'captured'".to_string(),
            ));
        }
    };

    let binding = descriptor.to_string();

    {
        let mut config = state.config.lock().await;
        config.hotkey.binding = binding.clone();
        config
            .save()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    }

    // The hotkey manager lives on the main thread for the app's lifetime;
    // the new binding is picked up on the next launch.
    info!(binding = %binding, "Hotkey updated, effective on next launch");

    Ok(Json(HotkeyResponse { binding }))
}
