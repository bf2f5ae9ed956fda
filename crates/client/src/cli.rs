use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{GatewayConfig, ENV_URL};
use crate::error::{GatewayError, Result};

/// Command-line interface for the `mbgate` binary.
#[derive(Debug, Parser)]
#[command(
    name = "mbgate",
    about = "Authenticated gateway to the Metabase REST API",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Connection flags; each falls back to its `METABASE_*` variable.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Metabase base URL, e.g. https://metabase.example.com.
    #[arg(long, env = "METABASE_URL")]
    pub url: Option<String>,
    /// API key (takes precedence over every other credential).
    #[arg(long, env = "METABASE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Existing session token.
    #[arg(long, env = "METABASE_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,
    #[arg(long, env = "METABASE_USERNAME")]
    pub username: Option<String>,
    #[arg(long, env = "METABASE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Per-request timeout in milliseconds (default 30000).
    #[arg(long, env = "METABASE_TIMEOUT_MS", value_name = "MILLIS")]
    pub timeout_ms: Option<u64>,
}

impl ConnectionArgs {
    pub fn into_config(self) -> Result<GatewayConfig> {
        let url = self.url.ok_or_else(|| {
            GatewayError::Config(format!("{ENV_URL} must be set (or pass --url)"))
        })?;
        let mut config = GatewayConfig::new(&url)?;
        if let Some(key) = self.api_key {
            config = config.with_api_key(key);
        }
        if let Some(token) = self.session_token {
            config = config.with_session_token(token);
        }
        if let (Some(user), Some(pass)) = (self.username.clone(), self.password.clone()) {
            config = config.with_login(user, pass);
        } else {
            config.username = self.username;
            config.password = self.password;
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        config.validate()?;
        Ok(config)
    }
}

/// Available `mbgate` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Prints which authentication mode the current settings select (no network).
    Auth,
    /// Authenticates and fetches the current user.
    Check,
    /// Sends one request through the gateway and prints the JSON response.
    Call {
        /// GET, POST, PUT or DELETE.
        method: String,
        /// Path relative to the Metabase URL, e.g. /api/database.
        path: String,
        /// JSON request body.
        #[arg(long)]
        body: Option<String>,
    },
}
