//! Authenticated request-dispatch core for the Metabase REST API.
//!
//! [`GatewayClient`] owns the connection settings, picks one authentication
//! mode (API key, session token, or a username/password login performed on
//! first use), and attaches the credential to every outbound call. MCP tool
//! layers build on [`GatewayClient::call`] or the typed wrappers in
//! [`resources`], and format results through [`tool_result`].
//!
//! The `mbgate` binary wraps the same client for operators; its entry point is
//! [`run`].

mod app;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod resources;
pub mod tool_result;

pub use app::run;
pub use auth::{AuthKind, AuthMode, SessionState};
pub use client::{GatewayClient, HttpMethod, RequestBody, SESSION_PATH};
pub use config::{GatewayConfig, DEFAULT_TIMEOUT};
pub use error::{GatewayError, Result};
pub use query::QueryParams;
