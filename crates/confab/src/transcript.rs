use std::sync::Mutex;

use chrono::{DateTime, Datelike, Local, Timelike};
use serde::Serialize;
use tracing::debug;

/// Generate the session title from a local wall-clock instant.
///
/// Fixed pattern `Meeting DD_MM_YY_HH_MM_SS`, zero-padded two-digit fields.
pub fn session_title(now: DateTime<Local>) -> String {
    format!(
        "Meeting {:02}_{:02}_{:02}_{:02}_{:02}_{:02}",
        now.day(),
        now.month(),
        now.year() % 100,
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// Snapshot of the transcript state for the control surface.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSnapshot {
    /// Title of the current (or last) session, if any.
    pub title: Option<String>,
    /// Whether a session is currently marked active.
    pub session_active: bool,
    /// Buffered transcript segments for the current session.
    pub segments: Vec<String>,
}

#[derive(Default)]
struct TranscriptInner {
    title: Option<String>,
    session_active: bool,
    segments: Vec<String>,
}

/// Transcript state shared between the coordinator and the UI surfaces.
///
/// The coordinator sets the title *before* asking the service to start, so
/// any UI showing the title is never ahead of or behind the service; the
/// segment buffer is cleared the moment a session is acknowledged.
#[derive(Default)]
pub struct TranscriptState {
    inner: Mutex<TranscriptInner>,
}

impl TranscriptState {
    /// Create an empty transcript state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Propagate the generated title ahead of the service start call.
    pub fn set_title(&self, title: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.title = Some(title.to_string());
        }
    }

    /// Clear the buffer and mark the session active for dependent UI.
    pub fn begin_session(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.segments.clear();
            inner.session_active = true;
        }
        debug!("Transcript buffer cleared for new session");
    }

    /// Mark the session inactive; buffered segments are kept for review.
    pub fn end_session(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.session_active = false;
        }
    }

    /// Append a segment pushed by the recording service.
    pub fn append(&self, segment: String) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.segments.push(segment);
        }
    }

    /// Current state for the control surface.
    pub fn snapshot(&self) -> TranscriptSnapshot {
        match self.inner.lock() {
            Ok(inner) => TranscriptSnapshot {
                title: inner.title.clone(),
                session_active: inner.session_active,
                segments: inner.segments.clone(),
            },
            Err(_) => TranscriptSnapshot {
                title: None,
                session_active: false,
                segments: Vec::new(),
            },
        }
    }
}
