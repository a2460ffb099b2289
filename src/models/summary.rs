//! Response shapes for the gateway's discovery and listing endpoints

use crate::models::{Dependencies, HealthResult, HealthStatus, Manifest, ServiceType};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityFlags {
    pub api: bool,
    pub tool_provider: bool,
}

impl From<&Manifest> for CapabilityFlags {
    fn from(manifest: &Manifest) -> Self {
        Self {
            api: manifest.has_api(),
            tool_provider: manifest.has_tool_provider(),
        }
    }
}

/// One service as reported by `GET /services`
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSummary {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub version: String,
    pub description: String,
    pub capabilities: CapabilityFlags,
    pub health: Option<HealthResult>,
    pub endpoints: Vec<String>,
    pub tools: Vec<String>,
    pub tags: BTreeSet<String>,
}

impl ServiceSummary {
    pub fn new(manifest: &Manifest, health: Option<HealthResult>) -> Self {
        Self {
            service_type: manifest.service_type,
            version: manifest.version.clone(),
            description: manifest.description.clone(),
            capabilities: CapabilityFlags::from(manifest),
            health,
            endpoints: manifest.declared_endpoints().to_vec(),
            tools: manifest.declared_tools().to_vec(),
            tags: manifest.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiServiceSummary {
    pub version: String,
    pub description: String,
    pub url: String,
    pub port: u16,
    pub endpoints: Vec<String>,
    pub health: Option<HealthStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolServiceSummary {
    pub version: String,
    pub description: String,
    /// Only set for providers reachable over HTTP
    pub url: Option<String>,
    pub protocol: String,
    pub tools: Vec<String>,
    pub health: Option<HealthStatus>,
}

/// Manifest-only view used by `GET /discovery`
#[derive(Debug, Clone, Serialize)]
pub struct ManifestSummary {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub version: String,
    pub description: String,
    pub capabilities: CapabilityFlags,
    pub dependencies: Dependencies,
    pub tags: BTreeSet<String>,
}

impl From<&Manifest> for ManifestSummary {
    fn from(manifest: &Manifest) -> Self {
        Self {
            service_type: manifest.service_type,
            version: manifest.version.clone(),
            description: manifest.description.clone(),
            capabilities: CapabilityFlags::from(manifest),
            dependencies: manifest.dependencies.clone(),
            tags: manifest.tags.clone(),
        }
    }
}
