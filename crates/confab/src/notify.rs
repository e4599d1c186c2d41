use notify_rust::Notification;
use tracing::warn;

/// Best-effort desktop notifications.
///
/// Delivery failures are logged and swallowed; a notification that cannot
/// be shown must never affect session state.
#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    /// Create a notifier; `enabled = false` turns every call into a no-op.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Informational notice (e.g. "download in progress, please wait").
    pub fn info(&self, summary: &str, body: &str) {
        self.show(summary, body);
    }

    /// Error notice (e.g. "model not ready", failed starts).
    pub fn error(&self, summary: &str, body: &str) {
        self.show(summary, body);
    }

    /// The best-effort recording-started notice.
    pub fn recording_started(&self, title: &str) {
        self.show("Recording started", title);
    }

    fn show(&self, summary: &str, body: &str) {
        if !self.enabled {
            return;
        }

        let notification = Notification::new()
            .appname("Confab")
            .summary(summary)
            .body(body)
            .finalize();

        // Showing can block on the desktop bus; keep it off the runtime.
        let summary = summary.to_string();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = notification.show() {
                warn!(summary, error = %e, "Failed to deliver notification");
            }
        });
    }
}
