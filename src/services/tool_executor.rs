//! Tool invocation on a single provider

use crate::error::GatewayError;
use crate::registry::ServiceRegistry;
use crate::services::jsonrpc::{JsonRpcRequest, RpcClient};
use serde_json::Value;
use std::time::Duration;
use tracing::info;

/// Forwards `tools/call` requests to tool providers with an HTTP API
///
/// Tool execution may take far longer than a health probe, so this carries
/// its own (longer) timeout.
#[derive(Clone)]
pub struct ToolExecutor {
    rpc: RpcClient,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            rpc: RpcClient::new(client),
            timeout,
        }
    }

    /// Calls `tool` on `service` and returns the provider's `result`
    ///
    /// # Errors
    ///
    /// * `ServiceNotFound` - no such service is registered
    /// * `CapabilityMismatch` - the service is not a tool provider
    /// * `NotImplemented` - the provider has no HTTP API (stdio transport)
    /// * `Timeout` / `Unreachable` / `Protocol` - the call itself failed
    pub async fn execute(
        &self,
        registry: &ServiceRegistry,
        service: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, GatewayError> {
        let manifest = registry
            .get(service)
            .ok_or_else(|| GatewayError::ServiceNotFound(service.to_string()))?;

        if !manifest.has_tool_provider() {
            return Err(GatewayError::CapabilityMismatch {
                service: service.to_string(),
                capability: "tool-provider",
            });
        }

        if !manifest.has_api() {
            return Err(GatewayError::NotImplemented(format!(
                "{} uses the {} transport; only HTTP tool providers can be called through the gateway",
                service,
                manifest.tool_protocol().unwrap_or("stdio")
            )));
        }

        let url = format!("{}/", registry.addressing().base_url(&manifest));
        info!(service = %service, tool = %tool, "Executing tool");

        self.rpc
            .call(
                service,
                &url,
                &JsonRpcRequest::call_tool(tool, arguments),
                self.timeout,
            )
            .await
    }
}
