use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::auth::{credential_value, AuthKind, AuthMode, SessionState};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::query::QueryParams;

/// Session-creation endpoint. Never routed through the auth guard.
pub const SESSION_PATH: &str = "/api/session";

/// HTTP verbs the gateway forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = GatewayError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(GatewayError::InvalidRequest(format!(
                "unsupported HTTP method '{other}' (expected GET, POST, PUT or DELETE)"
            ))),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Payload of an outbound request.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Sent verbatim as `application/json`.
    Json(Value),
    /// Sent as `multipart/form-data`; used for CSV uploads.
    Multipart(Form),
}

impl From<Option<Value>> for RequestBody {
    fn from(body: Option<Value>) -> Self {
        body.map(Self::Json).unwrap_or_default()
    }
}

/// Single authenticated channel to a Metabase instance.
///
/// Every request goes through [`GatewayClient::call_with`], which makes sure a
/// credential is established before dispatching. In username/password mode
/// the first call performs the login; concurrent first calls may each log in
/// and the last token stored wins.
pub struct GatewayClient {
    base_url: Url,
    timeout: Duration,
    mode: AuthMode,
    state: RwLock<SessionState>,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        let mode = AuthMode::resolve(&config)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            base_url = %config.base_url,
            auth = %mode.kind(),
            "Metabase gateway client configured"
        );

        Ok(Self {
            base_url: config.base_url,
            timeout: config.timeout,
            state: RwLock::new(mode.initial_state()),
            mode,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn auth_kind(&self) -> AuthKind {
        self.mode.kind()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_established()
    }

    /// Generic call: `method` on `path` with an optional JSON body.
    pub async fn call(&self, method: HttpMethod, path: &str, body: Option<Value>) -> Result<Value> {
        self.call_with(method, path, &QueryParams::new(), body.into())
            .await
    }

    /// Generic call with query parameters and any body kind.
    pub async fn call_with(
        &self,
        method: HttpMethod,
        path: &str,
        query: &QueryParams,
        body: RequestBody,
    ) -> Result<Value> {
        if !is_login_request(method, path) {
            self.ensure_authenticated().await?;
        }
        self.dispatch(method, path, query, body).await
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.call(HttpMethod::Get, path, None).await
    }

    pub async fn get_with_query(&self, path: &str, query: &QueryParams) -> Result<Value> {
        self.call_with(HttpMethod::Get, path, query, RequestBody::Empty)
            .await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.call(HttpMethod::Post, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.call(HttpMethod::Put, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.call(HttpMethod::Delete, path, None).await
    }

    /// Log in if no credential is established yet.
    ///
    /// Skips the login whenever a credential is already present; a failed
    /// login leaves the state unestablished so the next call tries again.
    pub async fn ensure_authenticated(&self) -> Result<()> {
        if self.state.read().is_established() {
            return Ok(());
        }
        let AuthMode::Login { username, password } = &self.mode else {
            return Err(GatewayError::Authentication(
                "no credential established and no login configured".into(),
            ));
        };
        let token = self.login(username, password).await?;
        *self.state.write() = SessionState::Session(token);
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<String> {
        debug!(username, "logging in to Metabase");
        let body = json!({ "username": username, "password": password });
        let response = self
            .dispatch(
                HttpMethod::Post,
                SESSION_PATH,
                &QueryParams::new(),
                RequestBody::Json(body),
            )
            .await
            .map_err(|err| {
                warn!(error = %err, "Metabase login failed");
                GatewayError::Authentication(err.to_string())
            })?;

        let token = response
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                warn!("Metabase login response had no session id");
                GatewayError::Authentication("login response did not include a session id".into())
            })?;
        credential_value(token).map_err(|_| {
            warn!("Metabase login returned a session id that cannot be sent as a header");
            GatewayError::Authentication("login returned an unusable session id".into())
        })?;
        info!("Metabase session established");
        Ok(token.to_string())
    }

    async fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        query: &QueryParams,
        body: RequestBody,
    ) -> Result<Value> {
        let url = self.endpoint(path)?;
        let credential = self.state.read().header(&self.mode)?;

        let mut request = self.http.request(method.into(), url);
        if let Some((name, value)) = credential {
            request = request.header(name, value);
        }
        if !query.is_empty() {
            request = request.query(query.pairs());
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(path, e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(path, e))?;
        debug!(%method, path, status = status.as_u16(), "Metabase request completed");

        if !status.is_success() {
            let message = upstream_message(status, &bytes);
            warn!(%method, path, status = status.as_u16(), %message, "Metabase request failed");
            return Err(GatewayError::Upstream { status, message });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|source| GatewayError::Decode {
            path: path.to_string(),
            source,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let target = path.split(['?', '#']).next().unwrap_or_default();
        if target.starts_with("//") || Url::parse(target).is_ok() {
            return Err(GatewayError::InvalidRequest(format!(
                "expected a path relative to the Metabase URL, got '{path}'"
            )));
        }
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|e| GatewayError::InvalidRequest(format!("invalid path '{path}': {e}")))
    }

    fn transport_error(&self, path: &str, source: reqwest::Error) -> GatewayError {
        if source.is_timeout() {
            GatewayError::Timeout {
                path: path.to_string(),
                timeout_ms: self.timeout.as_millis(),
            }
        } else {
            GatewayError::Transport {
                path: path.to_string(),
                source,
            }
        }
    }
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("mode", &self.mode)
            .field("state", &*self.state.read())
            .finish()
    }
}

fn is_login_request(method: HttpMethod, path: &str) -> bool {
    if method != HttpMethod::Post {
        return false;
    }
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_matches('/');
    trimmed == SESSION_PATH.trim_start_matches('/')
}

/// Best human-readable message from an error body.
fn upstream_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(msg) = value.get("message").and_then(Value::as_str) {
            return msg.to_string();
        }
        if let Some(msg) = value.as_str() {
            return msg.to_string();
        }
        if !value.is_null() {
            return value.to_string();
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        text.to_string()
    }
}
