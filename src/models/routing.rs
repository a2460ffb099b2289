use crate::models::health::HealthStatus;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiRoute {
    pub host: String,
    pub port: u16,
    pub endpoints: Vec<String>,
    pub health_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolRoute {
    pub host: String,
    /// `None` for tool providers without an HTTP API (stdio transports)
    pub port: Option<u16>,
    pub tools: Vec<String>,
    pub protocol: String,
}

/// Read-only projection of the registry used to resolve backend targets
///
/// Never stored; rebuilt from the current registry snapshot on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingTable {
    pub api_services: BTreeMap<String, ApiRoute>,
    pub tool_services: BTreeMap<String, ToolRoute>,
    pub health_endpoints: BTreeMap<String, String>,
}
