use crate::transcript::{TranscriptState, session_title};

use chrono::{Local, TimeZone};

/// WHAT: Title generation matches the fixed wall-clock pattern
/// WHY: The service and every UI surface key sessions off this exact string
#[test]
#[allow(clippy::unwrap_used)]
fn given_fixed_instant_when_generating_title_then_exact_pattern() {
    // Given: 2024-03-07T09:05:03 local time
    let instant = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 3).unwrap();

    // When: Generating the title
    let title = session_title(instant);

    // Then: Day, month, two-digit year, then time, all zero-padded
    assert_eq!(title, "Meeting 07_03_24_09_05_03");
}

/// WHAT: Single-digit fields are zero-padded
/// WHY: Fixed-width titles sort and parse predictably downstream
#[test]
#[allow(clippy::unwrap_used)]
fn given_new_years_instant_when_generating_title_then_zero_padded() {
    let instant = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

    assert_eq!(session_title(instant), "Meeting 02_01_26_03_04_05");
}

/// WHAT: Beginning a session clears the buffer but keeps the title
/// WHY: The title is propagated before the service call; the buffer must
///      start empty the moment the session is acknowledged
#[test]
fn given_stale_segments_when_beginning_session_then_buffer_cleared() {
    // Given: A transcript carrying a title and old segments
    let transcript = TranscriptState::new();
    transcript.set_title("Meeting 07_03_24_09_05_03");
    transcript.append("old segment".to_string());

    // When: A new session begins
    transcript.begin_session();

    // Then: Buffer empty, session active, title intact
    let snapshot = transcript.snapshot();
    assert!(snapshot.segments.is_empty());
    assert!(snapshot.session_active);
    assert_eq!(
        snapshot.title.as_deref(),
        Some("Meeting 07_03_24_09_05_03")
    );
}

/// WHAT: Segments accumulate while active and survive session end
/// WHY: The snapshot feeds review UI after the session stops
#[test]
fn given_active_session_when_appending_and_ending_then_segments_kept() {
    let transcript = TranscriptState::new();
    transcript.begin_session();

    transcript.append("first".to_string());
    transcript.append("second".to_string());
    transcript.end_session();

    let snapshot = transcript.snapshot();
    assert_eq!(snapshot.segments, vec!["first", "second"]);
    assert!(!snapshot.session_active);
}
