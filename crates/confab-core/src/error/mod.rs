use error_location::ErrorLocation;
use thiserror::Error;

/// Engine-surface errors with source location tracking.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Models directory could not be created or read.
    #[error("Models directory unavailable: {path:?} {location}")]
    ModelsDirUnavailable {
        /// Directory that could not be used.
        path: std::path::PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Model name not present in the engine's catalog.
    #[error("Unknown model: {name} {location}")]
    UnknownModel {
        /// Requested model name.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Model file failed format validation.
    #[error("Invalid model file {path:?}: {reason} {location}")]
    InvalidModelFile {
        /// Path to the rejected file.
        path: std::path::PathBuf,
        /// Description of the validation failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Model download failed.
    #[error("Download failed for {name}: {reason} {location}")]
    DownloadFailed {
        /// Model that was being downloaded.
        name: String,
        /// Description of the download failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for EngineError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        EngineError::IoError {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
