//! Confab: meeting recording with coordinated session starts.
//!
//! Start requests race in from a hotkey, the tray, a deferred launch flag,
//! and an external broadcast; the session coordinator makes sure exactly
//! one wins, gated on transcription engine readiness.

mod analytics;
mod app;
mod app_command;
mod backend;
mod config;
mod coordinator;
mod error;
mod hotkey;
mod hotkey_handler;
mod notify;
mod server;
mod session_events;
mod session_status;
#[cfg(test)]
mod tests;
mod transcript;
mod tray_command;
mod tray_icon_state;
mod tray_manager;
mod trigger;

pub(crate) use {
    analytics::Analytics,
    app::App,
    app_command::AppCommand,
    backend::{HttpSessionBackend, SessionBackend},
    coordinator::SessionCoordinator,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    notify::Notifier,
    session_events::{SessionEvent, event_bus},
    session_status::SessionStatus,
    transcript::{TranscriptSnapshot, TranscriptState},
    tray_command::TrayCommand,
    tray_icon_state::TrayIconState,
    tray_manager::TrayManager,
    trigger::TriggerOrigin,
};

use crate::{config::Config, hotkey::HotkeyNormalizer, server::ServerState};

use std::sync::Arc;

use confab_core::{EngineSet, ReadinessProber};
use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{error, warn};

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("confab=debug")
        .init();

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Persists across event loop iterations — dropping it unregisters the hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                match cmd {
                    TrayCommand::SetState(state) => {
                        if let Err(e) = tray_manager.update_state(state) {
                            error!(error = ?e, "Failed to update tray icon");
                        }
                    }
                    TrayCommand::SetStartEnabled(enabled) => {
                        tray_manager.set_start_enabled(enabled);
                    }
                    TrayCommand::Shutdown => {
                        *control_flow = ControlFlow::ExitWithCode(0);
                    }
                }
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let models_root = match Config::models_root() {
                    Ok(dir) => dir,
                    Err(e) => {
                        error!("Failed to resolve models directory: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let engines = Arc::new(EngineSet::open(models_root));
                let prober = ReadinessProber::new(Arc::clone(&engines));
                let transcript = Arc::new(TranscriptState::new());
                let events = event_bus();
                let notifier = Notifier::new(config.behaviour.notifications);
                let backend = Arc::new(HttpSessionBackend::new(config.server.backend_url.clone()));
                let server_port = config.server.port;
                let descriptor = config.hotkey.descriptor();
                let config = Arc::new(Mutex::new(config));

                let coordinator = Arc::new(SessionCoordinator::new(
                    backend,
                    prober,
                    Arc::clone(&transcript),
                    Arc::clone(&config),
                    notifier,
                    events.clone(),
                ));

                let (command_tx, command_rx) = mpsc::channel(32);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);

                // Register hotkey on the main thread — tao's event loop pumps
                // the Windows messages needed for WM_HOTKEY delivery.
                // Registration can fail for bindings the platform registry
                // cannot express (fn on most non-Apple setups); the tray and
                // broadcast triggers still work, so this is non-fatal.
                let hotkey_id = match HotkeyHandler::register_hotkey(&descriptor) {
                    Ok((manager, id)) => {
                        hotkey_manager = Some(manager);
                        Some(id)
                    }
                    Err(e) => {
                        warn!(error = ?e, "Global hotkey unavailable");
                        None
                    }
                };

                let tray_proxy = tray_proxy.clone();
                let start_menu_id = tray_manager.start_item_id().clone();
                let settings_menu_id = tray_manager.settings_item_id().clone();
                let exit_menu_id = tray_manager.exit_item_id().clone();

                // Spawn tokio runtime on separate thread.
                // TrayManager and hotkey_manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let server_state = Arc::new(ServerState {
                            coordinator: Arc::clone(&coordinator),
                            engines,
                            transcript,
                            config: Arc::clone(&config),
                            events: events.clone(),
                            normalizer: HotkeyNormalizer::default(),
                        });

                        let app = App {
                            coordinator: Arc::clone(&coordinator),
                            config,
                            notifier,
                            tray_proxy,
                            command_tx: command_tx.clone(),
                            command_rx,
                            events,
                            shutdown_tx,
                            start_menu_id,
                            settings_menu_id,
                            exit_menu_id,
                        };

                        let hotkey_shutdown = shutdown_rx.clone();
                        let server_shutdown = shutdown_rx;

                        tokio::join!(
                            async {
                                if let Some(id) = hotkey_id {
                                    let handler = HotkeyHandler::new(
                                        id,
                                        Arc::clone(&coordinator),
                                        command_tx.clone(),
                                    );
                                    if let Err(e) = handler.run(hotkey_shutdown).await {
                                        error!(error = ?e, "Hotkey handler error");
                                    }
                                }
                            },
                            async {
                                if let Err(e) =
                                    server::serve(server_state, server_port, server_shutdown).await
                                {
                                    error!(error = ?e, "Control server error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        // Keep hotkey_manager alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
    });
}
