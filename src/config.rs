//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const SESSION_DIR_NAME: &str = "appadmin";

/// Errors produced while building an [`AdminConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("no session directory: set APPADMIN_SESSION_DIR")]
    NoSessionDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    pub timeouts: Timeouts,
    /// Directory holding the persisted session blob.
    pub session_dir: PathBuf,
}

impl AdminConfig {
    /// Build a config with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if `api_url` is not an absolute
    /// `http`/`https` URL.
    pub fn new(api_url: &str, session_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self { api_url: parse_api_url(api_url)?, timeouts: Timeouts::default(), session_dir: session_dir.into() })
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `APPADMIN_API_URL`: default `http://localhost:3000`
    /// - `APPADMIN_TIMEOUT_SECS`: default 10
    /// - `APPADMIN_CONNECT_TIMEOUT_SECS`: default 5
    /// - `APPADMIN_SESSION_DIR`: default `<user config dir>/appadmin`
    ///
    /// A `session_dir` argument wins over `APPADMIN_SESSION_DIR` and the
    /// default.
    ///
    /// # Errors
    ///
    /// Fails on a malformed API URL, or when no session directory can be
    /// determined.
    pub fn from_env(session_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(&std::env::var("APPADMIN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()))?;
        let timeouts = Timeouts {
            request_secs: env_parse_u64("APPADMIN_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("APPADMIN_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let session_dir = match (session_dir, std::env::var_os("APPADMIN_SESSION_DIR")) {
            (Some(dir), _) => dir,
            (None, Some(dir)) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_session_dir().ok_or(ConfigError::NoSessionDir)?,
        };

        Ok(Self { api_url, timeouts, session_dir })
    }

    /// Replace the API URL, validating it the same way [`Self::new`] does.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] for a malformed URL.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(api_url)?;
        Ok(self)
    }
}

fn default_session_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SESSION_DIR_NAME))
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => value,
        _ => {
            tracing::warn!(key, value = %raw, default, "ignoring invalid numeric setting");
            default
        }
    }
}

/// Validate an API base URL and strip trailing slashes.
fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidApiUrl { url: raw.to_owned(), reason: e.to_string() })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidApiUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
