use crate::TriggerOrigin;

/// Commands sent from trigger surfaces to the main application.
#[derive(Debug, Clone, Copy)]
pub enum AppCommand {
    /// Request a session start on behalf of a trigger origin.
    StartSession {
        /// Which trigger source asked.
        origin: TriggerOrigin,
    },
    /// Stop the current session.
    StopSession,
    /// Request application shutdown.
    Shutdown,
}
