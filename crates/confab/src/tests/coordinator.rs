use crate::{
    AppError, SessionEvent, SessionStatus, TriggerOrigin,
    tests::{MockBackend, harness},
};

use std::sync::atomic::Ordering;

/// WHAT: Concurrent start requests admit exactly one attempt
/// WHY: Three uncoordinated trigger sources race for the same session;
///      only the guard keeps the service from being started twice
#[tokio::test]
async fn given_concurrent_requests_when_starting_then_one_reaches_backend() {
    // Given: A ready engine and a slow but successful backend
    let h = harness(MockBackend::ok(), true, false);

    // When: All three origins request a start on the same scheduler
    let (a, b, c) = tokio::join!(
        h.coordinator.request_start(TriggerOrigin::Manual),
        h.coordinator.request_start(TriggerOrigin::Broadcast),
        h.coordinator.request_start(TriggerOrigin::DeferredFlag),
    );

    // Then: Every call resolves, but the service saw exactly one start
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(h.backend.start_calls.load(Ordering::SeqCst), 1);
}

/// WHAT: A request while recording is rejected without side effects
/// WHY: Requests observed while a session is live are dropped, not queued
#[tokio::test]
async fn given_recording_session_when_requesting_start_then_rejected_silently() {
    // Given: A session already acknowledged by the service
    let h = harness(MockBackend::ok(), true, false);
    #[allow(clippy::unwrap_used)]
    h.coordinator
        .request_start(TriggerOrigin::Manual)
        .await
        .unwrap();
    assert!(h.coordinator.is_recording());

    // When: Another origin asks for a start
    let result = h.coordinator.request_start(TriggerOrigin::Broadcast).await;

    // Then: It resolves Ok with no second service call
    assert!(result.is_ok());
    assert_eq!(h.backend.start_calls.load(Ordering::SeqCst), 1);
}

/// WHAT: is_activating is false after every code path
/// WHY: A stuck flag would permanently wedge all three trigger sources
#[tokio::test]
async fn given_any_outcome_when_request_resolves_then_activating_cleared() {
    // Success path
    let h = harness(MockBackend::ok(), true, false);
    let _ = h.coordinator.request_start(TriggerOrigin::Manual).await;
    assert!(!h.coordinator.is_activating());

    // Unready, download in flight
    let h = harness(MockBackend::ok(), false, true);
    let _ = h.coordinator.request_start(TriggerOrigin::Manual).await;
    assert!(!h.coordinator.is_activating());

    // Unready, nothing downloading
    let h = harness(MockBackend::ok(), false, false);
    let _ = h.coordinator.request_start(TriggerOrigin::Manual).await;
    assert!(!h.coordinator.is_activating());

    // Backend failure
    let h = harness(MockBackend::failing("device busy"), true, false);
    let _ = h.coordinator.request_start(TriggerOrigin::Manual).await;
    assert!(!h.coordinator.is_activating());
}

/// WHAT: Unready with a download in flight ends Idle with no service call
/// WHY: Starts must never reach the service while the engine is unready
#[tokio::test]
async fn given_downloading_model_when_requesting_start_then_idle_no_backend_call() {
    // Given: An engine that is not ready but is downloading
    let h = harness(MockBackend::ok(), false, true);
    let mut events = h.events.subscribe();

    // When: A start is requested
    let result = h.coordinator.request_start(TriggerOrigin::Broadcast).await;

    // Then: Resolves Ok, status is Idle, the service was never called,
    //       and the model picker was NOT requested (a download is running)
    assert!(result.is_ok());
    assert_eq!(h.coordinator.status(), SessionStatus::Idle);
    assert_eq!(h.backend.start_calls.load(Ordering::SeqCst), 0);
    assert!(events.try_recv().is_err());
}

/// WHAT: Unready with nothing downloading surfaces the model picker
/// WHY: "Go download a model" is the actionable recovery for a missing model
#[tokio::test]
async fn given_missing_model_when_requesting_start_then_picker_requested() {
    // Given: An engine with no models and no download in flight
    let h = harness(MockBackend::ok(), false, false);
    let mut events = h.events.subscribe();

    // When: A start is requested
    let result = h.coordinator.request_start(TriggerOrigin::Manual).await;

    // Then: Resolves Ok, status Idle, no service call, picker event raised
    assert!(result.is_ok());
    assert_eq!(h.coordinator.status(), SessionStatus::Idle);
    assert_eq!(h.backend.start_calls.load(Ordering::SeqCst), 0);
    #[allow(clippy::unwrap_used)]
    let event = events.try_recv().unwrap();
    assert!(matches!(event, SessionEvent::ModelPickerRequested));
}

/// WHAT: A successful start flips is_recording and clears the transcript
/// WHY: Dependent UI reads both the guard flag and the fresh buffer
#[tokio::test]
async fn given_ready_engine_when_start_succeeds_then_recording_with_empty_buffer() {
    // Given: A transcript with stale segments from a previous session
    let h = harness(MockBackend::ok(), true, false);
    h.transcript.append("left over".to_string());

    // When: A start succeeds
    #[allow(clippy::unwrap_used)]
    h.coordinator
        .request_start(TriggerOrigin::Manual)
        .await
        .unwrap();

    // Then: Recording flag set, buffer cleared, session active, title set
    assert!(h.coordinator.is_recording());
    let snapshot = h.transcript.snapshot();
    assert!(snapshot.segments.is_empty());
    assert!(snapshot.session_active);
    #[allow(clippy::unwrap_used)]
    let title = snapshot.title.unwrap();
    assert!(title.starts_with("Meeting "));
}

/// WHAT: Status is Starting before the service confirms
/// WHY: The transition must be observable even if the service hangs;
///      Recording is asserted only by the confirmation listener
#[tokio::test]
async fn given_successful_start_when_confirmed_then_status_becomes_recording() {
    // Given: A completed start that the service has not yet confirmed
    let h = harness(MockBackend::ok(), true, false);
    #[allow(clippy::unwrap_used)]
    h.coordinator
        .request_start(TriggerOrigin::Manual)
        .await
        .unwrap();
    assert!(matches!(
        h.coordinator.status(),
        SessionStatus::Starting { .. }
    ));

    // When: The service's started event arrives
    h.coordinator.confirm_started("session-1");

    // Then: Status is Recording
    assert_eq!(h.coordinator.status(), SessionStatus::Recording);
}

/// WHAT: A service failure ends in Error carrying the failure message
/// WHY: The UI must never show "starting" indefinitely after a failure
#[tokio::test]
async fn given_failing_backend_when_start_fails_then_error_status_and_rejection() {
    // Given: A backend that rejects with a message
    let h = harness(MockBackend::failing("no capture device"), true, false);

    // When: The manual origin requests a start
    let result = h.coordinator.request_start(TriggerOrigin::Manual).await;

    // Then: The caller receives the rejection, status carries the message,
    //       and is_recording stayed false
    assert!(matches!(result, Err(AppError::Backend { .. })));
    assert_eq!(
        h.coordinator.status(),
        SessionStatus::Error {
            message: "no capture device".to_string()
        }
    );
    assert!(!h.coordinator.is_recording());
    assert!(!h.coordinator.is_busy());
}

/// WHAT: Error is not terminal; the next start runs normally
/// WHY: The state machine returns to Starting from Error on success
#[tokio::test]
async fn given_error_status_when_requesting_again_then_start_proceeds() {
    // Given: A coordinator in Error state
    let h = harness(MockBackend::failing("flaky"), true, false);
    let _ = h.coordinator.request_start(TriggerOrigin::Manual).await;
    assert!(matches!(h.coordinator.status(), SessionStatus::Error { .. }));

    // When: A second attempt runs (same backend, still failing)
    let _ = h.coordinator.request_start(TriggerOrigin::Broadcast).await;

    // Then: The attempt was admitted and reached the service again
    assert_eq!(h.backend.start_calls.load(Ordering::SeqCst), 2);
}

/// WHAT: Stopping releases the guard for the next session
/// WHY: The toggle cycle must come back to an admissible idle period
#[tokio::test]
async fn given_recording_session_when_stopped_then_new_start_admitted() {
    // Given: A live session
    let h = harness(MockBackend::ok(), true, false);
    #[allow(clippy::unwrap_used)]
    h.coordinator
        .request_start(TriggerOrigin::Manual)
        .await
        .unwrap();

    // When: Stopping and starting again
    h.coordinator.request_stop().await;
    assert_eq!(h.coordinator.status(), SessionStatus::Idle);
    assert!(!h.transcript.snapshot().session_active);
    #[allow(clippy::unwrap_used)]
    h.coordinator
        .request_start(TriggerOrigin::Manual)
        .await
        .unwrap();

    // Then: The service saw the stop and a second start
    assert_eq!(h.backend.stop_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.backend.start_calls.load(Ordering::SeqCst), 2);
}

/// WHAT: A started event with no session in flight is ignored
/// WHY: The coordinator must not assert Recording on a stray signal
#[tokio::test]
async fn given_idle_coordinator_when_stray_started_event_then_status_unchanged() {
    let h = harness(MockBackend::ok(), true, false);

    h.coordinator.confirm_started("ghost-session");

    assert_eq!(h.coordinator.status(), SessionStatus::Idle);
}
