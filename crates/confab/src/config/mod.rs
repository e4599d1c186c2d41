mod behaviour_config;
mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod hotkey_config;
mod provider_config;
mod server_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, capture_config::CaptureConfig, config::Config,
    hotkey_config::HotkeyConfig, provider_config::ProviderConfig, server_config::ServerConfig,
};

pub(crate) const DEFAULT_NOTIFICATIONS: bool = true;
pub(crate) const DEFAULT_PORT: u16 = 7878;
pub(crate) const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5167";

pub(crate) fn default_notifications() -> bool {
    DEFAULT_NOTIFICATIONS
}

pub(crate) fn default_port() -> u16 {
    DEFAULT_PORT
}

pub(crate) fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}
