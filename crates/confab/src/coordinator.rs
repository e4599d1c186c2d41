//! Session activation coordinator.
//!
//! All three trigger sources funnel through [`SessionCoordinator::request_start`];
//! exactly one request per idle period reaches the recording service, side
//! effects fire in a fixed order, and every failure lands in a well-defined
//! `Idle`/`Error` state rather than a half-started one.

use crate::{
    Analytics, AppError, AppResult, Notifier, SessionBackend, SessionEvent, SessionStatus,
    TranscriptState, TriggerOrigin, config::Config, transcript::session_title,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::Local;
use confab_core::ReadinessProber;
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Status message when a start failure carries no message of its own.
const START_FAILURE_FALLBACK: &str = "Failed to start recording session";

/// RAII claim on the activation slot.
///
/// Holds `is_activating` true for the duration of an attempt and clears it
/// on drop, so no early return or error path can leave the flag stuck true
/// and wedge all three trigger sources.
struct ActivationTicket<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ActivationTicket<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Sole owner of the session guard flags and status value.
///
/// Trigger sources hold this behind an `Arc` and never touch guard state
/// directly; admission happens only through `request_start`.
pub struct SessionCoordinator {
    /// True once the service has acknowledged a started session.
    is_recording: AtomicBool,
    /// True for the duration of an in-flight activation attempt.
    is_activating: AtomicBool,
    /// Service-assigned id of the current session, for stop requests.
    current_session: StdMutex<Option<String>>,
    status_tx: watch::Sender<SessionStatus>,
    backend: Arc<dyn SessionBackend>,
    prober: ReadinessProber,
    transcript: Arc<TranscriptState>,
    config: Arc<Mutex<Config>>,
    notifier: Notifier,
    analytics: Analytics,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionCoordinator {
    /// Wire up a coordinator over its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        prober: ReadinessProber,
        transcript: Arc<TranscriptState>,
        config: Arc<Mutex<Config>>,
        notifier: Notifier,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Idle);
        Self {
            is_recording: AtomicBool::new(false),
            is_activating: AtomicBool::new(false),
            current_session: StdMutex::new(None),
            status_tx,
            backend,
            prober,
            transcript,
            config,
            notifier,
            analytics: Analytics,
            events,
        }
    }

    /// Subscribe to status transitions.
    pub fn status_rx(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// Current status snapshot.
    pub fn status(&self) -> SessionStatus {
        self.status_tx.borrow().clone()
    }

    /// Whether a session is recording or an activation is in flight.
    ///
    /// For caller-side control disabling only; admission is decided by the
    /// guard inside `request_start`, never by this peek.
    pub fn is_busy(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst) || self.is_activating.load(Ordering::SeqCst)
    }

    /// Whether the service has acknowledged a running session.
    pub fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    /// Whether an activation attempt is in flight.
    pub fn is_activating(&self) -> bool {
        self.is_activating.load(Ordering::SeqCst)
    }

    /// Attempt to start a session on behalf of `origin`.
    ///
    /// Duplicate and concurrent requests return without side effects while
    /// a session is recording or another activation is in flight. Unready
    /// engines resolve to a notification plus a reset to `Idle`; only a
    /// service start failure is propagated, because its recovery is
    /// origin-specific.
    #[instrument(skip(self))]
    pub async fn request_start(&self, origin: TriggerOrigin) -> AppResult<()> {
        // Read-then-set with no suspension point in between: this is what
        // keeps two sources whose requests interleave on the scheduler from
        // both passing the guard. Rejected requests are dropped, not queued.
        let Some(_ticket) = self.begin_activation(origin) else {
            return Ok(());
        };
        // From here on, _ticket clears `is_activating` when it drops, on
        // every path out of this function.

        let attempt_id = Uuid::new_v4();

        // Provider and devices are read fresh per attempt; a download may
        // have finished or the provider changed since the last one.
        let (provider, microphone, system_audio) = {
            let cfg = self.config.lock().await;
            (
                cfg.provider.engine.clone(),
                cfg.capture.microphone.clone(),
                cfg.capture.system_audio.clone(),
            )
        };

        info!(
            attempt_id = %attempt_id,
            origin = %origin,
            provider = %provider,
            "Session start requested"
        );

        if !self.prober.check_ready(&provider).await {
            if self.prober.check_downloading(&provider).await {
                self.notifier.info(
                    "Model download in progress",
                    "The transcription model is still downloading. Try again once it finishes.",
                );
                self.analytics.session_start_blocked_downloading(origin);
            } else {
                self.notifier.error(
                    "Transcription model not ready",
                    "No usable model is installed for the selected provider. Download one from the model settings.",
                );
                self.analytics.session_start_blocked_missing(origin);
                let _ = self.events.send(SessionEvent::ModelPickerRequested);
            }

            // The service is never called while unready.
            self.set_status(SessionStatus::Idle);
            return Ok(());
        }

        let title = session_title(Local::now());
        // Title reaches the transcript before the service sees it, so UI
        // showing the title is never out of sync with service state.
        self.transcript.set_title(&title);

        // Observable before the (possibly slow) service call.
        self.set_status(SessionStatus::Starting {
            message: format!("Starting {title}"),
        });

        match self
            .backend
            .start(microphone.as_deref(), system_audio.as_deref(), &title)
            .await
        {
            Ok(handle) => {
                self.is_recording.store(true, Ordering::SeqCst);
                self.remember_session(&handle.id);
                self.transcript.begin_session();
                self.analytics.session_start_succeeded(origin);
                self.notifier.recording_started(&title);
                info!(
                    attempt_id = %attempt_id,
                    session_id = %handle.id,
                    "Session start acknowledged"
                );
                // Status moves to Recording only when the service's started
                // event arrives; see confirm_started.
                Ok(())
            }
            Err(e) => {
                let message = failure_message(&e);
                self.set_status(SessionStatus::Error {
                    message: message.clone(),
                });
                self.is_recording.store(false, Ordering::SeqCst);
                self.analytics.session_start_failed(origin, &message);
                warn!(
                    attempt_id = %attempt_id,
                    origin = %origin,
                    error = %e,
                    "Session start failed"
                );
                Err(e)
            }
        }
    }

    /// React to the service's authoritative started event.
    ///
    /// The commit path only records "we believe the service started"; this
    /// is the one place `Recording` is asserted.
    pub fn confirm_started(&self, session_id: &str) {
        if !self.is_recording.load(Ordering::SeqCst) {
            warn!(session_id, "Started event for a session this process did not start");
            return;
        }
        self.set_status(SessionStatus::Recording);
        info!(session_id, "Recording confirmed by service");
    }

    /// Stop the current session, if any. Service errors are logged only.
    #[instrument(skip(self))]
    pub async fn request_stop(&self) {
        if !self.is_recording.swap(false, Ordering::SeqCst) {
            return;
        }

        let session_id = self
            .current_session
            .lock()
            .ok()
            .and_then(|mut current| current.take());

        if let Some(id) = session_id {
            if let Err(e) = self.backend.stop(&id).await {
                warn!(session_id = %id, error = %e, "Recording service stop failed");
            }
        }

        self.transcript.end_session();
        self.set_status(SessionStatus::Idle);
        info!("Session stopped");
    }

    fn begin_activation(&self, origin: TriggerOrigin) -> Option<ActivationTicket<'_>> {
        if self.is_recording.load(Ordering::SeqCst) {
            debug!(origin = %origin, "Start request rejected: already recording");
            return None;
        }
        if self.is_activating.swap(true, Ordering::SeqCst) {
            debug!(origin = %origin, "Start request rejected: activation already in flight");
            return None;
        }
        Some(ActivationTicket {
            flag: &self.is_activating,
        })
    }

    fn remember_session(&self, id: &str) {
        if let Ok(mut current) = self.current_session.lock() {
            *current = Some(id.to_string());
        }
    }

    fn set_status(&self, status: SessionStatus) {
        debug!(status = ?status, "Status transition");
        let _ = self.status_tx.send_replace(status);
    }
}

/// The message an `Error` status carries for a failed start.
fn failure_message(error: &AppError) -> String {
    let message = error.user_message();
    if message.is_empty() {
        START_FAILURE_FALLBACK.to_string()
    } else {
        message
    }
}
