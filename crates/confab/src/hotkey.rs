//! Canonical hotkey descriptors and the raw key-event normalizer.
//!
//! A descriptor is an ordered, de-duplicated list of modifiers followed by
//! exactly one non-modifier key, joined by `+` (e.g. `fn+space`,
//! `cmd+shift+space`). A descriptor with zero modifiers is invalid and is
//! never produced: the feature exists for held-modifier push-to-talk, and a
//! bare key would collide with normal typing.

use crate::{AppError, AppResult};

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;
use serde::Deserialize;

/// Compiled-in default binding, reconciled against the persisted one at
/// startup.
pub const DEFAULT_HOTKEY: &str = "fn+space";

/// A modifier key, in canonical priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// The fn/globe key.
    Fn,
    /// Control.
    Control,
    /// Command / meta.
    Command,
    /// Option / alt.
    Option,
    /// Shift.
    Shift,
}

impl Modifier {
    /// Fixed ordering applied to every descriptor.
    pub const PRIORITY: [Modifier; 5] = [
        Modifier::Fn,
        Modifier::Control,
        Modifier::Command,
        Modifier::Option,
        Modifier::Shift,
    ];

    /// Canonical token used in rendered descriptors.
    pub fn token(&self) -> &'static str {
        match self {
            Modifier::Fn => "fn",
            Modifier::Control => "ctrl",
            Modifier::Command => "cmd",
            Modifier::Option => "option",
            Modifier::Shift => "shift",
        }
    }

    /// Parse a modifier token, accepting common aliases.
    pub fn from_token(token: &str) -> Option<Modifier> {
        match token.to_lowercase().as_str() {
            "fn" | "function" => Some(Modifier::Fn),
            "ctrl" | "control" => Some(Modifier::Control),
            "cmd" | "command" | "meta" => Some(Modifier::Command),
            "opt" | "option" | "alt" => Some(Modifier::Option),
            "shift" => Some(Modifier::Shift),
            _ => None,
        }
    }
}

/// Modifier flags reported by a raw key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct HeldModifiers {
    /// fn/globe held, where the event source can report it.
    #[serde(rename = "fn", default)]
    pub fn_key: bool,
    /// Control held.
    #[serde(default)]
    pub control: bool,
    /// Command/meta held.
    #[serde(default)]
    pub command: bool,
    /// Option/alt held.
    #[serde(default)]
    pub option: bool,
    /// Shift held.
    #[serde(default)]
    pub shift: bool,
}

impl HeldModifiers {
    fn contains(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Fn => self.fn_key,
            Modifier::Control => self.control,
            Modifier::Command => self.command,
            Modifier::Option => self.option,
            Modifier::Shift => self.shift,
        }
    }

    fn set(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Fn => self.fn_key = true,
            Modifier::Control => self.control = true,
            Modifier::Command => self.command = true,
            Modifier::Option => self.option = true,
            Modifier::Shift => self.shift = true,
        }
    }
}

/// A raw physical key event as delivered by a capture surface: the primary
/// key identifier plus the modifier flags reported with it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawKeyEvent {
    /// Primary key identifier (`"a"`, `" "`, `"Enter"`, `"F1"`, ...).
    pub key: String,
    /// Modifier flags held with the key.
    #[serde(default)]
    pub modifiers: HeldModifiers,
}

/// Canonical modifier-plus-key combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyDescriptor {
    modifiers: Vec<Modifier>,
    key: String,
}

impl HotkeyDescriptor {
    /// Modifiers in canonical order; never empty.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// The single non-modifier key token.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for HotkeyDescriptor {
    /// The compiled-in default binding ([`DEFAULT_HOTKEY`]).
    fn default() -> Self {
        Self {
            modifiers: vec![Modifier::Fn],
            key: "space".to_string(),
        }
    }
}

impl std::fmt::Display for HotkeyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.token())?;
        }
        f.write_str(&self.key)
    }
}

impl FromStr for HotkeyDescriptor {
    type Err = AppError;

    fn from_str(input: &str) -> AppResult<Self> {
        let tokens: Vec<String> = input
            .split('+')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if tokens.is_empty() {
            return Err(AppError::InvalidHotkey {
                reason: "hotkey cannot be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut held = HeldModifiers::default();
        let mut key: Option<String> = None;

        for token in &tokens {
            if let Some(modifier) = Modifier::from_token(token) {
                held.set(modifier);
            } else {
                if key.is_some() {
                    return Err(AppError::InvalidHotkey {
                        reason: "only one non-modifier key is supported".to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                key = Some(canonical_key_token(token).ok_or_else(|| {
                    AppError::InvalidHotkey {
                        reason: format!("unsupported key: {token}"),
                        location: ErrorLocation::from(Location::caller()),
                    }
                })?);
            }
        }

        let key = key.ok_or_else(|| AppError::InvalidHotkey {
            reason: "hotkey must include a key (e.g. space, f1)".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let modifiers: Vec<Modifier> = Modifier::PRIORITY
            .into_iter()
            .filter(|m| held.contains(*m))
            .collect();

        if modifiers.is_empty() {
            return Err(AppError::InvalidHotkey {
                reason: "at least one modifier is required".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(HotkeyDescriptor { modifiers, key })
    }
}

/// Map a raw key identifier to its canonical descriptor token.
///
/// Keys that make no sense as hold-to-talk triggers (arrows, navigation,
/// anything multi-character and unnamed) map to `None`.
fn canonical_key_token(key: &str) -> Option<String> {
    let lower = key.trim().to_lowercase();

    match lower.as_str() {
        " " | "space" | "spacebar" => return Some("space".to_string()),
        "enter" | "return" => return Some("enter".to_string()),
        "tab" => return Some("tab".to_string()),
        "escape" | "esc" => return Some("escape".to_string()),
        _ => {}
    }

    if let Some(digits) = lower.strip_prefix('f') {
        if let Ok(n) = digits.parse::<u8>() {
            if (1..=20).contains(&n) {
                return Some(lower);
            }
        }
    }

    let mut chars = key.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_graphic() => Some(c.to_ascii_lowercase().to_string()),
        _ => None,
    }
}

/// Converts raw key events into canonical descriptors.
#[derive(Debug, Clone, Copy)]
pub struct HotkeyNormalizer {
    /// Read zero reported modifiers as fn held.
    ///
    /// Some event paths cannot report the fn key at all; there, zero held
    /// modifiers is indistinguishable from fn-plus-key. Enabled only where
    /// that defect is known to exist — on sources that do report fn this
    /// misreads genuinely bare key presses.
    pub synthesize_fn_when_unreported: bool,
}

impl Default for HotkeyNormalizer {
    fn default() -> Self {
        Self {
            synthesize_fn_when_unreported: cfg!(target_os = "macos"),
        }
    }
}

impl HotkeyNormalizer {
    /// Normalize a raw key event into a descriptor, or reject it.
    ///
    /// Rejected: a modifier as the primary key, a non-enumerable key, and
    /// (unless the fn fallback applies) a key with zero held modifiers.
    pub fn normalize(&self, event: &RawKeyEvent) -> Option<HotkeyDescriptor> {
        if Modifier::from_token(&event.key).is_some() {
            return None;
        }

        let key = canonical_key_token(&event.key)?;

        let mut modifiers: Vec<Modifier> = Modifier::PRIORITY
            .into_iter()
            .filter(|m| event.modifiers.contains(*m))
            .collect();

        if modifiers.is_empty() {
            if !self.synthesize_fn_when_unreported {
                return None;
            }
            modifiers.push(Modifier::Fn);
        }

        Some(HotkeyDescriptor { modifiers, key })
    }
}
