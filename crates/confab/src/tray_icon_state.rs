/// Tray icon states corresponding to the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Ready to start a session.
    Idle,
    /// Activation committed, waiting on the recording service.
    Starting,
    /// Recording confirmed.
    Recording,
    /// Last activation failed.
    Error,
}
