use crate::{
    AppCommand, AppResult, Notifier, SessionCoordinator, SessionEvent, SessionStatus,
    TrayCommand, TrayIconState, TriggerOrigin, config::Config,
};

use std::sync::Arc;

use tao::event_loop::EventLoopProxy;
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;

/// Main application state.
///
/// Runs on the async runtime thread. Communicates tray icon updates
/// back to the main thread via `tray_proxy` because `TrayIcon` is `!Send`
/// and must remain on the UI thread.
pub struct App {
    pub(crate) coordinator: Arc<SessionCoordinator>,
    pub(crate) config: Arc<Mutex<Config>>,
    pub(crate) notifier: Notifier,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) events: broadcast::Sender<SessionEvent>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) start_menu_id: tray_icon::menu::MenuId,
    pub(crate) settings_menu_id: tray_icon::menu::MenuId,
    pub(crate) exit_menu_id: tray_icon::menu::MenuId,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Confab starting");

        // Tray event forwarding via single persistent blocking task.
        //
        // MenuEvent::receiver() returns a crossbeam_channel::Receiver which
        // HAS blocking recv() -- zero polling, instant response, one thread.
        //
        // Shutdown: when tray_event_rx is dropped (main loop breaks),
        // tray_event_tx.blocking_send() fails, breaking the blocking loop.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        let mut events_rx = self.events.subscribe();
        let mut status_rx = self.coordinator.status_rx();

        // The recording surface is up: consume the deferred one-shot flag.
        // It is cleared before the attempt, whatever the outcome.
        let deferred = {
            let mut config = self.config.lock().await;
            match config.take_start_next_launch() {
                Ok(flag) => flag,
                Err(e) => {
                    error!(error = ?e, "Failed to consume deferred start flag");
                    false
                }
            }
        };
        if deferred {
            self.start_session(TriggerOrigin::DeferredFlag).await;
        }

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    if let Err(e) = self.handle_tray_event(event).await {
                        error!(error = ?e, "Failed to handle tray event");
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::StartSession { origin } => {
                            self.start_session(origin).await;
                        }
                        AppCommand::StopSession => {
                            self.coordinator.request_stop().await;
                        }
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                event = events_rx.recv() => {
                    match event {
                        Ok(event) => self.handle_session_event(event).await,
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "Session event bus lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!("Session event bus closed");
                            break;
                        }
                    }
                }

                Ok(()) = status_rx.changed() => {
                    let status = status_rx.borrow_and_update().clone();
                    self.push_tray_state(&status);
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(tray_event_rx);

        match tokio::time::timeout(std::time::Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.shutdown_tx.send(true);
        info!("Confab shut down successfully");

        Ok(())
    }

    /// Funnel a start request into the coordinator with origin-specific
    /// failure recovery.
    #[instrument(skip(self))]
    async fn start_session(&self, origin: TriggerOrigin) {
        // Disable the manual control for the duration of the attempt; the
        // coordinator's guard stays the real mutual-exclusion mechanism.
        let _ = self
            .tray_proxy
            .send_event(TrayCommand::SetStartEnabled(false));

        let result = self.coordinator.request_start(origin).await;

        let _ = self.tray_proxy.send_event(TrayCommand::SetStartEnabled(
            !self.coordinator.is_busy(),
        ));

        let Err(e) = result else {
            return;
        };

        error!(origin = %origin, error = %e, "Session start failed");

        match origin {
            // The manual caller owns recovery: show the failure and take
            // the user to device selection.
            TriggerOrigin::Manual => {
                let message = {
                    let m = e.user_message();
                    if m.is_empty() {
                        "Could not start the session".to_string()
                    } else {
                        m
                    }
                };
                self.notifier.error(
                    "Recording failed to start",
                    &format!("{message}. Pick different capture devices in Settings."),
                );
                self.open_settings().await;
            }
            // No caller to hand the error to: surface a generic alert.
            TriggerOrigin::DeferredFlag | TriggerOrigin::Broadcast => {
                self.notifier.error(
                    "Recording failed to start",
                    "Could not start the session. Check the recording service and try again.",
                );
            }
        }
    }

    async fn handle_session_event(&self, event: SessionEvent) {
        debug!(event = event.name(), "Session event received");

        match event {
            SessionEvent::DirectStartRequested => {
                self.start_session(TriggerOrigin::Broadcast).await;
            }
            SessionEvent::Started { session_id } => {
                // The authoritative service signal; this is what moves
                // status to Recording.
                self.coordinator.confirm_started(&session_id);
            }
            SessionEvent::ModelPickerRequested => {
                let url = {
                    let config = self.config.lock().await;
                    format!("{}/models", config.settings_url())
                };
                if let Err(e) = open::that(url) {
                    warn!(error = %e, "Failed to open model settings");
                }
            }
        }
    }

    fn push_tray_state(&self, status: &SessionStatus) {
        let state = match status {
            SessionStatus::Idle => TrayIconState::Idle,
            SessionStatus::Starting { .. } => TrayIconState::Starting,
            SessionStatus::Recording => TrayIconState::Recording,
            SessionStatus::Error { .. } => TrayIconState::Error,
        };

        let _ = self.tray_proxy.send_event(TrayCommand::SetState(state));
        let _ = self.tray_proxy.send_event(TrayCommand::SetStartEnabled(
            !self.coordinator.is_busy(),
        ));
    }

    async fn open_settings(&self) {
        let url = {
            let config = self.config.lock().await;
            config.settings_url()
        };
        if let Err(e) = open::that(url) {
            warn!(error = %e, "Failed to open settings");
        }
    }

    /// Handle tray menu events.
    #[instrument(skip(self))]
    async fn handle_tray_event(&mut self, event: MenuEvent) -> AppResult<()> {
        let event_id = &event.id;

        if *event_id == self.start_menu_id {
            if self.coordinator.is_recording() {
                self.coordinator.request_stop().await;
            } else if self.coordinator.is_busy() {
                debug!("Tray start ignored: activation in flight");
            } else {
                self.start_session(TriggerOrigin::Manual).await;
            }
        } else if *event_id == self.settings_menu_id {
            self.open_settings().await;
            info!("Opened settings UI");
        } else if *event_id == self.exit_menu_id {
            info!("Exit requested from tray menu");
            let _ = self.tray_proxy.send_event(TrayCommand::Shutdown);
            if let Err(e) = self.command_tx.send(AppCommand::Shutdown).await {
                error!(error = ?e, "Failed to send shutdown command");
            }
        }

        Ok(())
    }
}
