use serde::Serialize;

/// Process-wide session lifecycle, owned exclusively by the coordinator.
///
/// `Idle → Starting → Recording → Error → Idle`; `Error` is not terminal,
/// the next successful start returns to `Starting`. At most one of
/// `Starting`/`Recording` is ever active; requests observed in either are
/// rejected, not queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SessionStatus {
    /// No session and no activation in flight.
    Idle,
    /// Activation committed, waiting on the recording service.
    Starting {
        /// Human-readable progress message for the UI.
        message: String,
    },
    /// Recording confirmed by the service.
    Recording,
    /// Last activation failed.
    Error {
        /// The failure message the UI shows.
        message: String,
    },
}
