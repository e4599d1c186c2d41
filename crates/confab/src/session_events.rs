use tokio::sync::broadcast;

/// Capacity of the session event bus. Events are small and consumers are
/// fast; lagging receivers drop the oldest events.
const EVENT_BUS_CAPACITY: usize = 32;

/// Events carried on the process-wide session bus.
///
/// The bus decouples "we asked the service to start" from "the service
/// confirmed it started": the coordinator's commit path never asserts
/// `Recording` itself, it waits for `Started` from the service webhook.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// External direct-start request; carries no payload.
    DirectStartRequested,
    /// The recording service confirmed a session is live.
    Started {
        /// Service-assigned session id.
        session_id: String,
    },
    /// A blocked start asked for the model-selection UI to be surfaced.
    ModelPickerRequested,
}

impl SessionEvent {
    /// Fixed wire/log name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::DirectStartRequested => "session-direct-start",
            SessionEvent::Started { .. } => "session-recording-started",
            SessionEvent::ModelPickerRequested => "model-picker-requested",
        }
    }
}

/// Create the session event bus.
pub fn event_bus() -> broadcast::Sender<SessionEvent> {
    broadcast::channel(EVENT_BUS_CAPACITY).0
}
