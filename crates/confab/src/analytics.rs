use crate::TriggerOrigin;

use tracing::info;

/// Target under which activation analytics events are emitted; operators
/// route it to their collector via the subscriber's env filter.
const ANALYTICS_TARGET: &str = "confab::analytics";

/// Emitter for the activation analytics signals.
///
/// Every signal is tagged with the trigger origin so the three sources can
/// be compared in aggregate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Analytics;

impl Analytics {
    /// A start reached the recording service and was acknowledged.
    pub fn session_start_succeeded(&self, origin: TriggerOrigin) {
        info!(
            target: ANALYTICS_TARGET,
            event = "session-start-succeeded",
            origin = origin.tag(),
        );
    }

    /// A start failed at the recording service.
    pub fn session_start_failed(&self, origin: TriggerOrigin, reason: &str) {
        info!(
            target: ANALYTICS_TARGET,
            event = "session-start-failed",
            origin = origin.tag(),
            reason,
        );
    }

    /// A start was blocked because a model download is in flight.
    pub fn session_start_blocked_downloading(&self, origin: TriggerOrigin) {
        info!(
            target: ANALYTICS_TARGET,
            event = "session-start-blocked-downloading",
            origin = origin.tag(),
        );
    }

    /// A start was blocked because no usable model is present.
    pub fn session_start_blocked_missing(&self, origin: TriggerOrigin) {
        info!(
            target: ANALYTICS_TARGET,
            event = "session-start-blocked-missing",
            origin = origin.tag(),
        );
    }
}
