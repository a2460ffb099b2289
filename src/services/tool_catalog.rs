//! Gateway-wide tool catalog
//!
//! Each tool provider is asked for its tools through a fallback chain:
//!
//! 1. JSON-RPC `tools/list` POSTed to `http://{host}:{port}/` (API services only)
//! 2. REST `GET http://{host}:{port}/tools` (API services only)
//! 3. Tool names declared in the manifest
//!
//! Providers are queried concurrently and every failure stays inside its own
//! catalog entry.

use crate::error::GatewayError;
use crate::models::Manifest;
use crate::registry::ServiceRegistry;
use crate::services::jsonrpc::{JsonRpcRequest, RpcClient};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "inputSchema",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub input_schema: Option<Value>,
    /// Anything else the provider reported (annotations, titles, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolInfo {
    /// Catalog entry for a tool only known by its declared name
    pub fn declared(service: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: Some(format!("Tool from {}", service)),
            input_schema: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection refused, DNS failure and the like
    Unreachable,
    Timeout,
    /// The service answered, but not with a usable tool list
    ProtocolError,
}

impl From<&GatewayError> for FailureKind {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::Timeout { .. } => FailureKind::Timeout,
            GatewayError::Unreachable { .. } => FailureKind::Unreachable,
            _ => FailureKind::ProtocolError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CatalogEntry {
    Tools(Vec<ToolInfo>),
    Failed { error: String, kind: FailureKind },
}

impl CatalogEntry {
    pub fn tools(&self) -> Option<&[ToolInfo]> {
        match self {
            CatalogEntry::Tools(tools) => Some(tools),
            CatalogEntry::Failed { .. } => None,
        }
    }
}

/// One entry per tool provider, keyed by service name
pub type ToolCatalog = BTreeMap<String, CatalogEntry>;

#[derive(Deserialize)]
#[serde(untagged)]
enum ToolListing {
    Bare(Vec<ToolInfo>),
    Wrapped { tools: Vec<ToolInfo> },
}

impl From<ToolListing> for Vec<ToolInfo> {
    fn from(listing: ToolListing) -> Self {
        match listing {
            ToolListing::Bare(tools) | ToolListing::Wrapped { tools } => tools,
        }
    }
}

#[derive(Clone)]
pub struct ToolCatalogService {
    client: reqwest::Client,
    rpc: RpcClient,
    timeout: Duration,
}

impl ToolCatalogService {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            rpc: RpcClient::new(client.clone()),
            client,
            timeout,
        }
    }

    /// Builds the catalog for every tool provider in the registry
    pub async fn list_all_tools(&self, registry: &ServiceRegistry) -> ToolCatalog {
        let providers = registry.tool_services();

        let lookups = providers.iter().map(|manifest| {
            let base_url = manifest
                .has_api()
                .then(|| registry.addressing().base_url(manifest));
            async move {
                let entry = self.list_service_tools(manifest, base_url.as_deref()).await;
                (manifest.name.clone(), entry)
            }
        });

        join_all(lookups).await.into_iter().collect()
    }

    /// Runs the fallback chain for one provider
    ///
    /// `base_url` is `None` for providers without an HTTP API; those go
    /// straight to their declared tools.
    pub async fn list_service_tools(
        &self,
        manifest: &Arc<Manifest>,
        base_url: Option<&str>,
    ) -> CatalogEntry {
        let service = manifest.name.as_str();
        let mut last_error = None;

        if let Some(base_url) = base_url {
            match self.list_via_rpc(service, base_url).await {
                Ok(tools) => return CatalogEntry::Tools(tools),
                Err(e) => {
                    debug!(service = %service, error = %e, "tools/list failed, trying REST");
                    last_error = Some(e);
                }
            }

            match self.list_via_rest(service, base_url).await {
                Ok(tools) => return CatalogEntry::Tools(tools),
                Err(e) => {
                    debug!(service = %service, error = %e, "REST /tools failed, using manifest");
                    last_error = Some(e);
                }
            }
        }

        let declared = manifest.declared_tools();
        if !declared.is_empty() {
            return CatalogEntry::Tools(
                declared
                    .iter()
                    .map(|name| ToolInfo::declared(service, name))
                    .collect(),
            );
        }

        match last_error {
            Some(e) => {
                warn!(service = %service, error = %e, "No tool list available");
                CatalogEntry::Failed {
                    kind: FailureKind::from(&e),
                    error: e.to_string(),
                }
            }
            None => CatalogEntry::Tools(Vec::new()),
        }
    }

    async fn list_via_rpc(&self, service: &str, base_url: &str) -> Result<Vec<ToolInfo>, GatewayError> {
        let url = format!("{}/", base_url);
        let result = self
            .rpc
            .call(service, &url, &JsonRpcRequest::list_tools(), self.timeout)
            .await?;

        serde_json::from_value::<ToolListing>(result)
            .map(Vec::from)
            .map_err(|e| GatewayError::Protocol {
                service: service.to_string(),
                message: format!("tools/list result has no tool list: {}", e),
            })
    }

    async fn list_via_rest(&self, service: &str, base_url: &str) -> Result<Vec<ToolInfo>, GatewayError> {
        let url = format!("{}/tools", base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(service, e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Protocol {
                service: service.to_string(),
                message: format!("GET /tools returned HTTP {}", status.as_u16()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::from_transport(service, e, self.timeout))?;

        serde_json::from_slice::<ToolListing>(&body)
            .map(Vec::from)
            .map_err(|e| GatewayError::Protocol {
                service: service.to_string(),
                message: format!("malformed GET /tools response: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_accepts_bare_and_wrapped() {
        let bare: ToolListing = serde_json::from_value(json!([{"name": "a"}])).unwrap();
        let wrapped: ToolListing =
            serde_json::from_value(json!({"tools": [{"name": "b", "description": "B"}]})).unwrap();

        assert_eq!(Vec::<ToolInfo>::from(bare)[0].name, "a");
        assert_eq!(
            Vec::<ToolInfo>::from(wrapped)[0].description.as_deref(),
            Some("B")
        );
    }

    #[test]
    fn test_failed_entry_shape() {
        let entry = CatalogEntry::Failed {
            error: "boom".into(),
            kind: FailureKind::Unreachable,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"error": "boom", "kind": "unreachable"})
        );
    }

    #[test]
    fn test_declared_tool_shape() {
        let tool = ToolInfo::declared("svc-b", "echo");
        assert_eq!(
            serde_json::to_value(&tool).unwrap(),
            json!({"name": "echo", "description": "Tool from svc-b"})
        );
    }
}
