//! Authentication mode selection and the in-memory session state.

use std::fmt;

use reqwest::header::{HeaderName, HeaderValue, InvalidHeaderValue};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const SESSION_HEADER: &str = "x-metabase-session";

/// How the client proves its identity to Metabase.
///
/// Picked once at construction: API key, then session token, then a
/// username/password pair that is exchanged for a session on first use.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    ApiKey(String),
    SessionToken(String),
    Login { username: String, password: String },
}

impl AuthMode {
    /// Resolve the mode from a config; first match wins.
    pub fn resolve(config: &GatewayConfig) -> Result<Self> {
        if let Some(key) = config.api_key.as_deref().filter(|v| !v.is_empty()) {
            credential_value(key).map_err(|_| invalid_credential(API_KEY_HEADER))?;
            return Ok(Self::ApiKey(key.to_string()));
        }
        if let Some(token) = config.session_token.as_deref().filter(|v| !v.is_empty()) {
            credential_value(token).map_err(|_| invalid_credential(SESSION_HEADER))?;
            return Ok(Self::SessionToken(token.to_string()));
        }
        match (config.username.as_deref(), config.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Ok(Self::Login {
                username: user.to_string(),
                password: pass.to_string(),
            }),
            _ => Err(GatewayError::Config(
                "Metabase credentials not provided or incomplete".into(),
            )),
        }
    }

    /// Session state the client starts with under this mode.
    pub fn initial_state(&self) -> SessionState {
        match self {
            Self::ApiKey(_) => SessionState::ApiKey,
            Self::SessionToken(token) => SessionState::Session(token.clone()),
            Self::Login { .. } => SessionState::Unestablished,
        }
    }

    pub fn kind(&self) -> AuthKind {
        match self {
            Self::ApiKey(_) => AuthKind::ApiKey,
            Self::SessionToken(_) => AuthKind::SessionToken,
            Self::Login { .. } => AuthKind::Login,
        }
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Self::SessionToken(_) => f.write_str("SessionToken(<redacted>)"),
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Secret-free label for an [`AuthMode`], safe to log or print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    ApiKey,
    SessionToken,
    Login,
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ApiKey => "api-key",
            Self::SessionToken => "session-token",
            Self::Login => "username/password",
        })
    }
}

/// Credential currently attached to outbound requests.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionState {
    Unestablished,
    ApiKey,
    Session(String),
}

impl SessionState {
    pub fn is_established(&self) -> bool {
        !matches!(self, Self::Unestablished)
    }

    /// Header to attach for this state, if any.
    ///
    /// The API key itself lives in [`AuthMode`]; the state only records that
    /// it is in use.
    pub fn header(&self, mode: &AuthMode) -> Result<Option<(HeaderName, HeaderValue)>> {
        let (name, raw) = match (self, mode) {
            (Self::Unestablished, _) => return Ok(None),
            (Self::ApiKey, AuthMode::ApiKey(key)) => (API_KEY_HEADER, key.as_str()),
            (Self::ApiKey, _) => {
                return Err(GatewayError::Authentication(
                    "API key state without an API key".into(),
                ))
            }
            (Self::Session(token), _) => (SESSION_HEADER, token.as_str()),
        };
        let value = credential_value(raw).map_err(|_| {
            GatewayError::Authentication(format!(
                "credential for {name} is not a valid header value"
            ))
        })?;
        Ok(Some((HeaderName::from_static(name), value)))
    }
}

/// Header value for a secret, marked sensitive so it is never logged.
pub(crate) fn credential_value(
    raw: &str,
) -> std::result::Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(raw)?;
    value.set_sensitive(true);
    Ok(value)
}

fn invalid_credential(header: &str) -> GatewayError {
    GatewayError::Config(format!(
        "credential for {header} contains characters not allowed in an HTTP header"
    ))
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unestablished => f.write_str("Unestablished"),
            Self::ApiKey => f.write_str("ApiKey"),
            Self::Session(_) => f.write_str("Session(<redacted>)"),
        }
    }
}
