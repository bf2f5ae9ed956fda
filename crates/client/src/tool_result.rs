//! Bridge between gateway calls and MCP tool results.
//!
//! Tool handlers format every successful response as one pretty-printed text
//! block and turn failures into error results carrying endpoint context, so
//! the agent sees the upstream message instead of a protocol error.

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content, Tool, ToolAnnotations};
use serde_json::{json, Map as JsonMap, Value};
use tracing::warn;

use crate::client::{GatewayClient, HttpMethod};
use crate::error::{GatewayError, Result};

/// Name of the generic passthrough tool.
pub const REQUEST_TOOL_NAME: &str = "metabase_api_request";

/// Definition of the passthrough tool that exposes [`GatewayClient::call`].
pub fn request_tool() -> Tool {
    let mut schema = JsonMap::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("required".into(), json!(["method", "path"]));
    schema.insert(
        "properties".into(),
        json!({
            "method": {
                "type": "string",
                "enum": ["GET", "POST", "PUT", "DELETE"],
                "description": "HTTP method"
            },
            "path": {
                "type": "string",
                "description": "API path relative to the Metabase URL, e.g. /api/card/12"
            },
            "body": {
                "type": "object",
                "description": "JSON body for POST/PUT requests"
            }
        }),
    );
    schema.insert("additionalProperties".into(), json!(false));

    Tool {
        name: REQUEST_TOOL_NAME.into(),
        title: Some("Call the Metabase API".into()),
        description: Some(
            "Send an authenticated request to any Metabase API endpoint and return the \
             JSON response."
                .into(),
        ),
        input_schema: Arc::new(schema),
        output_schema: None,
        annotations: Some(ToolAnnotations::default()),
        icons: None,
        meta: None,
    }
}

/// Successful response as a single text block.
pub fn json_text(value: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: None,
        is_error: Some(false),
        meta: None,
    }
}

/// Format a call outcome, prefixing failures with `context`.
pub fn from_call(context: &str, result: Result<Value>) -> CallToolResult {
    match result {
        Ok(value) => json_text(&value),
        Err(err) => {
            warn!(context, error = %err, "Metabase tool call failed");
            CallToolResult {
                content: vec![Content::text(format!("{context}: {err}"))],
                structured_content: None,
                is_error: Some(true),
                meta: None,
            }
        }
    }
}

/// Run the passthrough tool with raw MCP arguments.
pub async fn forward_request(
    client: &GatewayClient,
    args: Option<&JsonMap<String, Value>>,
) -> CallToolResult {
    let parsed = parse_request_args(args);
    let context = match &parsed {
        Ok((method, path, _)) => format!("{method} {path} failed"),
        Err(_) => format!("{REQUEST_TOOL_NAME} rejected its arguments"),
    };
    let result = match parsed {
        Ok((method, path, body)) => client.call(method, &path, body).await,
        Err(err) => Err(err),
    };
    from_call(&context, result)
}

fn parse_request_args(
    args: Option<&JsonMap<String, Value>>,
) -> Result<(HttpMethod, String, Option<Value>)> {
    let args = args.ok_or_else(|| GatewayError::InvalidRequest("arguments required".into()))?;
    let method = args
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::InvalidRequest("method is required".into()))?
        .parse::<HttpMethod>()?;
    let path = args
        .get("path")
        .and_then(Value::as_str)
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| GatewayError::InvalidRequest("path is required".into()))?
        .to_string();
    let body = args.get("body").filter(|b| !b.is_null()).cloned();
    Ok((method, path, body))
}
