use confab_core::EngineError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the confab binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Recording service rejected or failed a session request.
    #[error("Session backend error: {reason} {location}")]
    Backend {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Engine-surface error from confab-core.
    #[error("Engine error: {source} {location}")]
    Engine {
        /// The underlying engine error.
        #[source]
        source: EngineError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to register global hotkey.
    #[error("Hotkey registration failed: {reason} {location}")]
    HotkeyRegistrationFailed {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Persisted or submitted hotkey descriptor was rejected.
    #[error("Invalid hotkey: {reason} {location}")]
    InvalidHotkey {
        /// Why the descriptor was rejected.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send message through async channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Control server failed to bind or serve.
    #[error("Control server error: {reason} {location}")]
    ServerError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl AppError {
    /// Message suitable for status values and user-facing notices.
    ///
    /// Backend failures surface the service's own reason; everything else
    /// falls back to the display form.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Backend { reason, .. } => reason.trim().to_string(),
            other => other.to_string(),
        }
    }
}

// Manual From<EngineError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<EngineError> for AppError {
    #[track_caller]
    fn from(source: EngineError) -> Self {
        AppError::Engine {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
