//! Global hotkey registration and press handling.
//!
//! Registers the configured descriptor as a global hotkey and forwards
//! presses to the main application as start/stop commands. Uses async
//! channels to communicate with the main application.

use crate::{
    AppCommand, AppError, AppResult, SessionCoordinator, TriggerOrigin,
    hotkey::{HotkeyDescriptor, Modifier},
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Global hotkey handler feeding the manual trigger path.
pub struct HotkeyHandler {
    hotkey_id: u32,
    coordinator: Arc<SessionCoordinator>,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Register the descriptor as a global hotkey.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey(descriptor: &HotkeyDescriptor) -> AppResult<(GlobalHotKeyManager, u32)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let hotkey = registration(descriptor)?;

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register {}: {}", descriptor, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = %descriptor, "Global hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Create a handler for a previously registered hotkey.
    ///
    /// The `hotkey_id` should come from [`Self::register_hotkey`]. This
    /// struct is `Send` and can live on any thread — it only listens on the
    /// global [`GlobalHotKeyEvent`] channel.
    pub fn new(
        hotkey_id: u32,
        coordinator: Arc<SessionCoordinator>,
        command_tx: mpsc::Sender<AppCommand>,
    ) -> Self {
        Self {
            hotkey_id,
            coordinator,
            command_tx,
        }
    }

    /// Run the hotkey handler event loop.
    ///
    /// This method blocks until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Single persistent blocking task that forwards hotkey events.
        // GlobalHotKeyEvent::receiver() returns a crossbeam_channel::Receiver
        // which has blocking recv() -- zero polling, instant response, one thread.
        //
        // Shutdown: when event_rx is dropped (loop breaks), the next
        // event_tx.blocking_send() fails, breaking the blocking loop.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if event.id == self.hotkey_id && event.state == HotKeyState::Pressed {
                        self.handle_hotkey_press().await?;
                    }
                }
            }
        }

        // Drop event_rx to unblock the blocking task's next blocking_send().
        drop(event_rx);

        // Best-effort join: the blocking task may be stuck in recv() if no
        // hotkey event arrives after shutdown. Use a timeout to avoid hanging.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn handle_hotkey_press(&self) -> AppResult<()> {
        if self.coordinator.is_recording() {
            return self.send(AppCommand::StopSession).await;
        }

        // Caller-side discipline: this control disables itself while an
        // activation is in flight. The coordinator re-checks regardless.
        if self.coordinator.is_busy() {
            debug!("Hotkey press dropped: activation in flight");
            return Ok(());
        }

        self.send(AppCommand::StartSession {
            origin: TriggerOrigin::Manual,
        })
        .await
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send hotkey command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Map a descriptor onto the portable hotkey registry.
///
/// `fn` maps to the FN modifier; platforms whose registry cannot bind it
/// fail registration, which callers treat as non-fatal.
#[track_caller]
fn registration(descriptor: &HotkeyDescriptor) -> AppResult<HotKey> {
    let mut modifiers = Modifiers::empty();
    for modifier in descriptor.modifiers() {
        modifiers |= match modifier {
            Modifier::Fn => Modifiers::FN,
            Modifier::Control => Modifiers::CONTROL,
            Modifier::Command => Modifiers::META,
            Modifier::Option => Modifiers::ALT,
            Modifier::Shift => Modifiers::SHIFT,
        };
    }

    let code = key_code(descriptor.key()).ok_or_else(|| AppError::HotkeyRegistrationFailed {
        reason: format!("key '{}' has no registrable code", descriptor.key()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(HotKey::new(Some(modifiers), code))
}

fn key_code(token: &str) -> Option<Code> {
    let code = match token {
        "space" => Code::Space,
        "enter" => Code::Enter,
        "tab" => Code::Tab,
        "escape" => Code::Escape,
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "f13" => Code::F13,
        "f14" => Code::F14,
        "f15" => Code::F15,
        "f16" => Code::F16,
        "f17" => Code::F17,
        "f18" => Code::F18,
        "f19" => Code::F19,
        "f20" => Code::F20,
        _ => return None,
    };
    Some(code)
}
