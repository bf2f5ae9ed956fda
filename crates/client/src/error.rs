//! Error type shared by every gateway operation.

use reqwest::StatusCode;

/// Convenience alias used throughout the crate.
pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Failures surfaced by the gateway client.
///
/// Configuration errors are fatal at startup. Authentication errors come only
/// from the lazy login; everything else is a per-request failure that the
/// caller is expected to wrap with its own context.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to authenticate with Metabase: {0}")]
    Authentication(String),
    #[error("Metabase API error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },
    #[error("request to {path} timed out after {timeout_ms}ms")]
    Timeout { path: String, timeout_ms: u128 },
    #[error("transport error calling {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid JSON in response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Upstream HTTP status, when the failure came from a non-2xx response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}
