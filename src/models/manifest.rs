//! Typed service descriptors
//!
//! A descriptor is a YAML document living in its own directory under the
//! services root:
//!
//! ```yaml
//! name: weather
//! version: "1.2.0"
//! type: hybrid
//! description: Weather lookups
//! tags: [external]
//! capabilities:
//!   api:
//!     enabled: true
//!     port: 8001
//!     endpoints: ["/forecast", "/current"]
//!   tool_provider:
//!     enabled: true
//!     tools: [get_forecast]
//!     protocol: mcp
//! dependencies:
//!   required: [geo]
//! deployment:
//!   health_check: /healthz
//! ```
//!
//! Decoding goes through loosely-typed `Raw*` structs first, then an explicit
//! validation step builds the strict [`Manifest`].

use crate::error::ManifestError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Port assumed for API services that do not declare one
pub const DEFAULT_API_PORT: u16 = 8000;

/// Health path assumed when `deployment.health_check` is absent
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// Tool transport assumed when `tool_provider.protocol` is absent
pub const DEFAULT_TOOL_PROTOCOL: &str = "mcp";

/// Descriptors larger than this are rejected before decoding
pub const MAX_DESCRIPTOR_BYTES: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    Api,
    #[serde(alias = "tool_provider")]
    ToolProvider,
    Hybrid,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Api => "api",
            ServiceType::ToolProvider => "tool-provider",
            ServiceType::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability names accepted by capability queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityKind {
    Api,
    ToolProvider,
}

impl CapabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Api => "api",
            CapabilityKind::ToolProvider => "tool-provider",
        }
    }
}

impl std::str::FromStr for CapabilityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(CapabilityKind::Api),
            "tool-provider" | "tool_provider" => Ok(CapabilityKind::ToolProvider),
            other => Err(format!("unknown capability: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiCapability {
    pub port: Option<u16>,
    pub endpoints: Vec<String>,
}

impl ApiCapability {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_API_PORT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCapability {
    pub tools: Vec<String>,
    pub protocol: String,
}

/// Enabled capabilities, resolved once at parse time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Capabilities {
    None,
    Api(ApiCapability),
    ToolProvider(ToolCapability),
    Hybrid {
        api: ApiCapability,
        tools: ToolCapability,
    },
}

impl Capabilities {
    pub fn from_parts(api: Option<ApiCapability>, tools: Option<ToolCapability>) -> Self {
        match (api, tools) {
            (Some(api), Some(tools)) => Capabilities::Hybrid { api, tools },
            (Some(api), None) => Capabilities::Api(api),
            (None, Some(tools)) => Capabilities::ToolProvider(tools),
            (None, None) => Capabilities::None,
        }
    }

    pub fn api(&self) -> Option<&ApiCapability> {
        match self {
            Capabilities::Api(api) | Capabilities::Hybrid { api, .. } => Some(api),
            _ => None,
        }
    }

    pub fn tools(&self) -> Option<&ToolCapability> {
        match self {
            Capabilities::ToolProvider(tools) | Capabilities::Hybrid { tools, .. } => Some(tools),
            _ => None,
        }
    }

    pub fn has(&self, kind: CapabilityKind) -> bool {
        match kind {
            CapabilityKind::Api => self.api().is_some(),
            CapabilityKind::ToolProvider => self.tools().is_some(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(default)]
    pub required: BTreeSet<String>,
    #[serde(default)]
    pub optional: BTreeSet<String>,
}

/// Container command override, either a shell string or an exec vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    Shell(String),
    Exec(Vec<String>),
}

/// Deployment metadata; only `health_check` is read by the control plane
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(default)]
    pub health_check: Option<String>,
    #[serde(default)]
    pub environment: Vec<String>,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default)]
    pub command: Option<Command>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub capabilities: Capabilities,
    pub dependencies: Dependencies,
    pub deployment: Deployment,
    #[serde(skip)]
    pub source: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default, deserialize_with = "scalar_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    version: Option<String>,
    #[serde(default, rename = "type")]
    service_type: Option<ServiceType>,
    #[serde(default, deserialize_with = "scalar_string")]
    description: Option<String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    capabilities: RawCapabilities,
    #[serde(default)]
    dependencies: Dependencies,
    #[serde(default)]
    deployment: Deployment,
}

#[derive(Debug, Default, Deserialize)]
struct RawCapabilities {
    #[serde(default)]
    api: Option<RawApi>,
    #[serde(default, alias = "tool-provider")]
    tool_provider: Option<RawToolProvider>,
}

#[derive(Debug, Deserialize)]
struct RawApi {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    port: Option<i64>,
    #[serde(default)]
    endpoints: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawToolProvider {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    tools: Vec<String>,
    #[serde(default)]
    protocol: Option<String>,
}

/// Accepts `version: 1.0` as well as `version: "1.0"`
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_yaml::Value::Null) => None,
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
        Some(_) => {
            return Err(serde::de::Error::custom("expected a scalar value"));
        }
    })
}

fn is_hostname_safe(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

impl Manifest {
    /// Reads and parses the descriptor at `path`
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let read_err = |source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(path).map_err(read_err)?;
        if metadata.len() > MAX_DESCRIPTOR_BYTES {
            return Err(ManifestError::Invalid {
                path: path.to_path_buf(),
                reason: format!("descriptor too large (max {} bytes)", MAX_DESCRIPTOR_BYTES),
            });
        }

        let content = fs::read_to_string(path).map_err(read_err)?;
        Self::parse(path, &content)
    }

    /// Decodes and validates a raw descriptor
    ///
    /// `source` is only used for error reporting and [`Manifest::source`].
    pub fn parse(source: &Path, raw: &str) -> Result<Self, ManifestError> {
        let decoded: RawManifest =
            serde_yaml::from_str(raw).map_err(|e| ManifestError::Decode {
                path: source.to_path_buf(),
                source: e,
            })?;

        let invalid = |reason: String| ManifestError::Invalid {
            path: source.to_path_buf(),
            reason,
        };

        let mut missing = Vec::new();
        if decoded.name.is_none() {
            missing.push("name");
        }
        if decoded.version.is_none() {
            missing.push("version");
        }
        if decoded.service_type.is_none() {
            missing.push("type");
        }
        if decoded.description.is_none() {
            missing.push("description");
        }
        let (Some(name), Some(version), Some(service_type), Some(description)) = (
            decoded.name,
            decoded.version,
            decoded.service_type,
            decoded.description,
        ) else {
            return Err(invalid(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        };

        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        if !is_hostname_safe(&name) {
            return Err(invalid(format!(
                "name '{}' may only contain letters, digits, '-', '_' and '.'",
                name
            )));
        }
        if version.trim().is_empty() {
            return Err(invalid("version must not be empty".to_string()));
        }

        let api = match decoded.capabilities.api {
            Some(api) if api.enabled => {
                let port = match api.port {
                    None => None,
                    Some(p) if (1..=i64::from(u16::MAX)).contains(&p) => Some(p as u16),
                    Some(p) => {
                        return Err(invalid(format!(
                            "api.port must be between 1 and {}, got {}",
                            u16::MAX,
                            p
                        )));
                    }
                };
                Some(ApiCapability {
                    port,
                    endpoints: api.endpoints,
                })
            }
            _ => None,
        };

        let tools = match decoded.capabilities.tool_provider {
            Some(tp) if tp.enabled => Some(ToolCapability {
                tools: tp.tools,
                protocol: tp
                    .protocol
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_TOOL_PROTOCOL.to_string()),
            }),
            _ => None,
        };

        Ok(Manifest {
            name,
            version,
            service_type,
            description,
            tags: decoded.tags,
            capabilities: Capabilities::from_parts(api, tools),
            dependencies: decoded.dependencies,
            deployment: decoded.deployment,
            source: source.to_path_buf(),
        })
    }

    pub fn has_api(&self) -> bool {
        self.capabilities.api().is_some()
    }

    pub fn has_tool_provider(&self) -> bool {
        self.capabilities.tools().is_some()
    }

    /// Declared API port, or [`DEFAULT_API_PORT`]
    pub fn api_port(&self) -> u16 {
        self.capabilities
            .api()
            .map(ApiCapability::port)
            .unwrap_or(DEFAULT_API_PORT)
    }

    /// Health path, always starting with `/`
    pub fn health_check_path(&self) -> String {
        match self.deployment.health_check.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => {
                if path.starts_with('/') {
                    path.to_string()
                } else {
                    format!("/{}", path)
                }
            }
            _ => DEFAULT_HEALTH_PATH.to_string(),
        }
    }

    /// `http://{name}:{port}{health_path}`
    pub fn health_check_url(&self) -> String {
        self.health_check_url_on(&self.name)
    }

    pub fn health_check_url_on(&self, host: &str) -> String {
        format!("{}{}", self.base_url_on(host), self.health_check_path())
    }

    /// `http://{name}:{port}`
    pub fn base_url(&self) -> String {
        self.base_url_on(&self.name)
    }

    pub fn base_url_on(&self, host: &str) -> String {
        format!("http://{}:{}", host, self.api_port())
    }

    pub fn declared_endpoints(&self) -> &[String] {
        self.capabilities
            .api()
            .map(|api| api.endpoints.as_slice())
            .unwrap_or(&[])
    }

    pub fn declared_tools(&self) -> &[String] {
        self.capabilities
            .tools()
            .map(|tools| tools.tools.as_slice())
            .unwrap_or(&[])
    }

    pub fn tool_protocol(&self) -> Option<&str> {
        self.capabilities.tools().map(|tools| tools.protocol.as_str())
    }
}
