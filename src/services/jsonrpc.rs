//! JSON-RPC 2.0 framing for tool-provider calls
//!
//! Tool providers with an HTTP API accept `tools/list` and `tools/call`
//! requests POSTed to their root path.

use crate::error::GatewayError;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

pub const JSONRPC_VERSION: &str = "2.0";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(method: &str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Value::from(uuid::Uuid::new_v4().to_string()),
            method: method.to_string(),
            params,
        }
    }

    pub fn list_tools() -> Self {
        Self::new(METHOD_TOOLS_LIST, json!({}))
    }

    pub fn call_tool(name: &str, arguments: Value) -> Self {
        Self::new(
            METHOD_TOOLS_CALL,
            json!({
                "name": name,
                "arguments": arguments,
            }),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Sends framed requests to a tool provider and unwraps the `result`
#[derive(Clone)]
pub struct RpcClient {
    client: reqwest::Client,
}

impl RpcClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// POSTs `request` to `url` and returns the `result` member
    ///
    /// # Errors
    ///
    /// * `Timeout` / `Unreachable` - transport failure
    /// * `Protocol` - non-2xx status, undecodable body, a JSON-RPC `error`
    ///   member, or a response with neither `result` nor `error`
    pub async fn call(
        &self,
        service: &str,
        url: &str,
        request: &JsonRpcRequest,
        timeout: Duration,
    ) -> Result<Value, GatewayError> {
        let protocol = |message: String| GatewayError::Protocol {
            service: service.to_string(),
            message,
        };

        tracing::debug!(service = %service, method = %request.method, url = %url, "Sending JSON-RPC request");

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(service, e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(protocol(format!(
                "{} returned HTTP {}",
                request.method,
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::from_transport(service, e, timeout))?;

        let decoded: JsonRpcResponse = serde_json::from_slice(&body)
            .map_err(|e| protocol(format!("malformed {} response: {}", request.method, e)))?;

        if let Some(error) = decoded.error {
            return Err(protocol(format!(
                "{} failed with code {}: {}",
                request.method, error.code, error.message
            )));
        }

        decoded
            .result
            .ok_or_else(|| protocol(format!("{} response has no result", request.method)))
    }
}
