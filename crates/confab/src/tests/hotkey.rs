use crate::AppError;
use crate::hotkey::{
    DEFAULT_HOTKEY, HeldModifiers, HotkeyDescriptor, HotkeyNormalizer, RawKeyEvent,
};

fn event(key: &str, modifiers: HeldModifiers) -> RawKeyEvent {
    RawKeyEvent {
        key: key.to_string(),
        modifiers,
    }
}

fn strict() -> HotkeyNormalizer {
    HotkeyNormalizer {
        synthesize_fn_when_unreported: false,
    }
}

fn with_fallback() -> HotkeyNormalizer {
    HotkeyNormalizer {
        synthesize_fn_when_unreported: true,
    }
}

/// WHAT: Held modifiers plus a letter normalize in canonical order
/// WHY: The persisted descriptor must be stable whatever order the flags
///      were reported in
#[test]
#[allow(clippy::unwrap_used)]
fn given_ctrl_shift_a_when_normalizing_then_canonical_descriptor() {
    // Given: ctrl+shift held with primary key 'a'
    let raw = event(
        "a",
        HeldModifiers {
            shift: true,
            control: true,
            ..HeldModifiers::default()
        },
    );

    // When: Normalizing
    let descriptor = strict().normalize(&raw).unwrap();

    // Then: Fixed priority order, lower-cased key
    assert_eq!(descriptor.to_string(), "ctrl+shift+a");
}

/// WHAT: A bare modifier key is rejected
/// WHY: Descriptors capture modifier combinations held WITH a key, not a
///      modifier pressed alone
#[test]
fn given_modifier_primary_key_when_normalizing_then_rejected() {
    let raw = event(
        "shift",
        HeldModifiers {
            shift: true,
            ..HeldModifiers::default()
        },
    );

    assert!(strict().normalize(&raw).is_none());
    assert!(with_fallback().normalize(&raw).is_none());
}

/// WHAT: Zero held modifiers is rejected on strict sources
/// WHY: A bare key would collide with normal typing
#[test]
fn given_no_modifiers_when_normalizing_strictly_then_rejected() {
    let raw = event("space", HeldModifiers::default());

    assert!(strict().normalize(&raw).is_none());
}

/// WHAT: The fn fallback reads zero modifiers as fn held
/// WHY: The one event path that cannot report fn still has to produce
///      fn-based descriptors
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_modifiers_when_fallback_applies_then_fn_synthesized() {
    // Given: An event reporting no modifiers held, primary key space
    let raw = event("space", HeldModifiers::default());

    // When: Normalizing on the path that applies the fallback
    let descriptor = with_fallback().normalize(&raw).unwrap();

    // Then: fn is assumed
    assert_eq!(descriptor.to_string(), "fn+space");
}

/// WHAT: Non-enumerable keys are rejected
/// WHY: Arrows and navigation keys make no sense as hold-to-talk triggers
#[test]
fn given_arrow_key_when_normalizing_then_rejected() {
    let raw = event(
        "ArrowLeft",
        HeldModifiers {
            control: true,
            ..HeldModifiers::default()
        },
    );

    assert!(strict().normalize(&raw).is_none());
    // The fallback never rescues an unacceptable key.
    assert!(with_fallback().normalize(&event("Home", HeldModifiers::default())).is_none());
}

/// WHAT: Named keys and function-row keys map to canonical tokens
/// WHY: The descriptor grammar enumerates exactly these keys
#[test]
#[allow(clippy::unwrap_used)]
fn given_named_keys_when_normalizing_then_canonical_tokens() {
    let ctrl = HeldModifiers {
        control: true,
        ..HeldModifiers::default()
    };

    // Browser-style space comes through as a single blank character.
    assert_eq!(strict().normalize(&event(" ", ctrl)).unwrap().to_string(), "ctrl+space");
    assert_eq!(
        strict().normalize(&event("Enter", ctrl)).unwrap().to_string(),
        "ctrl+enter"
    );
    assert_eq!(
        strict().normalize(&event("F13", ctrl)).unwrap().to_string(),
        "ctrl+f13"
    );
    assert_eq!(strict().normalize(&event("Q", ctrl)).unwrap().to_string(), "ctrl+q");
}

/// WHAT: Parsing an already-canonical descriptor is idempotent
/// WHY: Persisted descriptors are re-parsed at startup and must not drift
#[test]
#[allow(clippy::unwrap_used)]
fn given_canonical_string_when_parsing_then_rendering_is_identity() {
    for canonical in ["ctrl+shift+a", "fn+space", "cmd+shift+space", "option+f5"] {
        let descriptor: HotkeyDescriptor = canonical.parse().unwrap();
        assert_eq!(descriptor.to_string(), canonical);
    }
}

/// WHAT: Parsing reorders and de-duplicates modifiers
/// WHY: One combination must have exactly one persisted representation
#[test]
#[allow(clippy::unwrap_used)]
fn given_unordered_aliased_input_when_parsing_then_canonicalized() {
    let descriptor: HotkeyDescriptor = "shift+meta+CTRL+ctrl+a".parse().unwrap();

    assert_eq!(descriptor.to_string(), "ctrl+cmd+shift+a");
}

/// WHAT: Descriptors without modifiers or without a key fail to parse
/// WHY: The zero-modifier invariant holds on the parse path too
#[test]
fn given_invalid_strings_when_parsing_then_rejected() {
    for invalid in ["space", "fn", "ctrl+", "", "ctrl+space+a", "ctrl+ArrowUp"] {
        let result: Result<HotkeyDescriptor, AppError> = invalid.parse();
        assert!(result.is_err(), "'{invalid}' should not parse");
    }
}

/// WHAT: The compiled-in default parses to the default descriptor
/// WHY: Startup reconciliation falls back to it on bad persisted data
#[test]
#[allow(clippy::unwrap_used)]
fn given_default_hotkey_when_parsing_then_matches_default_descriptor() {
    let parsed: HotkeyDescriptor = DEFAULT_HOTKEY.parse().unwrap();

    assert_eq!(parsed, HotkeyDescriptor::default());
    assert_eq!(parsed.to_string(), DEFAULT_HOTKEY);
}
