/// Which independent source asked for a session start.
///
/// All three funnel through `SessionCoordinator::request_start`; the origin
/// only changes notification wording and analytics tagging, never the guard
/// discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOrigin {
    /// A user control: the global hotkey or the tray menu item.
    Manual,
    /// The one-shot start-next-launch flag, consumed at mount.
    DeferredFlag,
    /// The externally broadcast direct-start event.
    Broadcast,
}

impl TriggerOrigin {
    /// Stable tag used in analytics events and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            TriggerOrigin::Manual => "manual",
            TriggerOrigin::DeferredFlag => "deferred-flag",
            TriggerOrigin::Broadcast => "broadcast",
        }
    }
}

impl std::fmt::Display for TriggerOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
