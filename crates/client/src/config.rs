use std::fmt;
use std::time::Duration;

use reqwest::Url;

use crate::error::{GatewayError, Result};

pub const ENV_URL: &str = "METABASE_URL";
pub const ENV_API_KEY: &str = "METABASE_API_KEY";
pub const ENV_SESSION_TOKEN: &str = "METABASE_SESSION_TOKEN";
pub const ENV_USERNAME: &str = "METABASE_USERNAME";
pub const ENV_PASSWORD: &str = "METABASE_PASSWORD";
pub const ENV_TIMEOUT_MS: &str = "METABASE_TIMEOUT_MS";

/// Timeout applied to every outbound request unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one Metabase instance.
///
/// Immutable once handed to [`crate::GatewayClient::new`]. At least one usable
/// credential form must be present: an API key, a session token, or a
/// username together with a password.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
    pub session_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Parse `base_url` and start a config with no credentials.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            base_url,
            api_key: None,
            session_token: None,
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = non_blank(Some(api_key.into()));
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = non_blank(Some(token.into()));
        self
    }

    pub fn with_login(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = non_blank(Some(username.into()));
        self.password = non_blank(Some(password.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load and validate settings from the `METABASE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let url = env_value(ENV_URL)
            .ok_or_else(|| GatewayError::Config(format!("{ENV_URL} must be set")))?;
        let timeout = env_value(ENV_TIMEOUT_MS)
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);

        let config = Self {
            base_url: parse_base_url(&url)?,
            api_key: env_value(ENV_API_KEY),
            session_token: env_value(ENV_SESSION_TOKEN),
            username: env_value(ENV_USERNAME),
            password: env_value(ENV_PASSWORD),
            timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the credential invariant and the URL scheme.
    ///
    /// Runs at load time and again when a client is constructed, so configs
    /// assembled by hand get the same checks as ones read from the environment.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(GatewayError::Config(format!(
                "unsupported URL scheme '{}' in {}",
                self.base_url.scheme(),
                self.base_url
            )));
        }
        let has_login = present(&self.username) && present(&self.password);
        if present(&self.api_key) || present(&self.session_token) || has_login {
            Ok(())
        } else {
            Err(GatewayError::Config(
                "Metabase credentials not provided or incomplete: set an API key, a session token, or both username and password".into(),
            ))
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> Option<&'static str> {
            value.as_ref().map(|_| "<redacted>")
        }
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &redact(&self.api_key))
            .field("session_token", &redact(&self.session_token))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    Url::parse(trimmed)
        .map_err(|e| GatewayError::Config(format!("invalid Metabase URL '{trimmed}': {e}")))
}

fn env_value(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
