//! Console configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_STATE_DIR: &str = ".infrakitchen";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("invalid INFRAKITCHEN_API_URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Backend base URL, without trailing slash.
    pub api_base_url: String,
    pub login_path: String,
    /// Directory holding durable client-side state (the redirect intent).
    pub state_dir: PathBuf,
    /// Path prefixes that never require a session, matched on whole segments.
    pub public_paths: Vec<String>,
    /// Discard redirect intents older than this; `None` keeps them until used.
    pub redirect_ttl_secs: Option<u64>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            public_paths: Vec::new(),
            redirect_ttl_secs: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ConsoleConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `INFRAKITCHEN_API_URL`: default `http://127.0.0.1:8000`
    /// - `INFRAKITCHEN_LOGIN_PATH`: default `/login`
    /// - `INFRAKITCHEN_STATE_DIR`: default `.infrakitchen`
    /// - `INFRAKITCHEN_PUBLIC_PATHS`: comma-separated path prefixes
    /// - `INFRAKITCHEN_REDIRECT_TTL_SECS`: unset keeps intents until consumed
    /// - `INFRAKITCHEN_REQUEST_TIMEOUT_SECS`: default 30
    /// - `INFRAKITCHEN_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the API URL does not parse, the login path
    /// is not absolute, or a numeric variable is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = parse_api_url(&std::env::var("INFRAKITCHEN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()))?;

        let login_path = std::env::var("INFRAKITCHEN_LOGIN_PATH").unwrap_or_else(|_| DEFAULT_LOGIN_PATH.into());
        if !login_path.starts_with('/') {
            return Err(ConfigError::Parse(format!("INFRAKITCHEN_LOGIN_PATH must start with '/': {login_path}")));
        }

        let state_dir = std::env::var("INFRAKITCHEN_STATE_DIR").map_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);
        let public_paths = std::env::var("INFRAKITCHEN_PUBLIC_PATHS")
            .map(|raw| parse_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            api_base_url,
            login_path,
            state_dir,
            public_paths,
            redirect_ttl_secs: env_parse_opt("INFRAKITCHEN_REDIRECT_TTL_SECS")?,
            request_timeout_secs: env_parse_opt("INFRAKITCHEN_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse_opt("INFRAKITCHEN_CONNECT_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }
}

fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidUrl { url: raw.to_owned(), reason: e.to_string() })?;
    Ok(trimmed.to_owned())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn env_parse_opt(key: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Parse(format!("{key} must be a non-negative integer, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
