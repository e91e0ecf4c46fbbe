//! Application settings and Matrix account configuration.

use serde::{Deserialize, Serialize};

/// Matrix account configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Homeserver base URL, e.g. `https://matrix.example.org`.
    pub homeserver_url: String,

    /// Access token of the bot account.
    pub access_token: String,
}

impl MatrixConfig {
    /// Creates a new Matrix configuration.
    #[must_use]
    pub const fn new(homeserver_url: String, access_token: String) -> Self {
        Self {
            homeserver_url,
            access_token,
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `MATRIX_HOMESERVER` and `MATRIX_ACCESS_TOKEN` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let homeserver_url = std::env::var("MATRIX_HOMESERVER")
            .map_err(|_| ConfigError::MissingEnvVar("MATRIX_HOMESERVER"))?;

        if !(homeserver_url.starts_with("https://") || homeserver_url.starts_with("http://")) {
            return Err(ConfigError::InvalidHomeserver(homeserver_url));
        }

        let access_token = std::env::var("MATRIX_ACCESS_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("MATRIX_ACCESS_TOKEN"))?;

        Ok(Self::new(homeserver_url, access_token))
    }
}

impl std::fmt::Debug for MatrixConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatrixConfig")
            .field("homeserver_url", &self.homeserver_url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Bot-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Initial state of the auto-invite toggle.
    #[serde(default = "default_auto_accept_invites")]
    pub auto_accept_invites: bool,

    /// Long-poll timeout for `/sync` in seconds.
    #[serde(default = "default_sync_timeout")]
    pub sync_timeout_secs: u64,

    /// Minimum interval between outgoing messages in milliseconds.
    #[serde(default = "default_min_send_interval")]
    pub min_send_interval_ms: u64,
}

const fn default_auto_accept_invites() -> bool {
    true
}

const fn default_sync_timeout() -> u64 {
    30
}

const fn default_min_send_interval() -> u64 {
    500
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            auto_accept_invites: default_auto_accept_invites(),
            sync_timeout_secs: default_sync_timeout(),
            min_send_interval_ms: default_min_send_interval(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            auto_accept_invites: std::env::var("AUTO_ACCEPT_INVITES")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or_else(default_auto_accept_invites),
            sync_timeout_secs: std::env::var("SYNC_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_sync_timeout),
            min_send_interval_ms: std::env::var("MIN_SEND_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_min_send_interval),
        }
    }
}

/// Parses the usual spellings of a boolean environment value.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid homeserver URL (must start with http:// or https://): {0}")]
    InvalidHomeserver(String),
}
