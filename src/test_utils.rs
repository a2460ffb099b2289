pub mod fixtures {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Descriptor for an API-only service
    pub fn api_manifest(name: &str, port: u16) -> String {
        format!(
            r#"name: {name}
version: "1.0.0"
type: api
description: Test API service {name}
capabilities:
  api:
    enabled: true
    port: {port}
    endpoints: ["/items"]
"#
        )
    }

    /// Descriptor for an API-only service with a custom health path
    pub fn api_manifest_with_health(name: &str, port: u16, health_path: &str) -> String {
        format!(
            "{}deployment:\n  health_check: {}\n",
            api_manifest(name, port),
            health_path
        )
    }

    /// Descriptor for a tool provider without an HTTP API (stdio transport)
    pub fn tool_manifest(name: &str, tools: &[&str]) -> String {
        format!(
            r#"name: {name}
version: "1.0.0"
type: tool-provider
description: Test tool provider {name}
capabilities:
  tool_provider:
    enabled: true
    tools: [{tools}]
    protocol: stdio
"#,
            tools = tools.join(", ")
        )
    }

    /// Descriptor for a service exposing both an API and tools
    pub fn hybrid_manifest(name: &str, port: u16, tools: &[&str]) -> String {
        format!(
            r#"name: {name}
version: "1.0.0"
type: hybrid
description: Test hybrid service {name}
capabilities:
  api:
    enabled: true
    port: {port}
  tool_provider:
    enabled: true
    tools: [{tools}]
    protocol: mcp
"#,
            tools = tools.join(", ")
        )
    }

    /// Writes `content` as `<root>/<dir_name>/manifest.yaml`
    pub fn write_service(root: &Path, dir_name: &str, content: &str) -> io::Result<PathBuf> {
        let dir = root.join(dir_name);
        fs::create_dir_all(&dir)?;
        let path = dir.join("manifest.yaml");
        fs::write(&path, content)?;
        Ok(path)
    }
}

pub mod test_helpers {
    use crate::config::Timeouts;
    use crate::error::ManifestError;
    use crate::gateway::Gateway;
    use crate::models::{Addressing, Manifest};
    use crate::registry::{HealthProber, ServiceRegistry};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    /// Registry that addresses every backend on 127.0.0.1, for mock servers
    pub fn local_registry(health_timeout: Duration) -> ServiceRegistry {
        let prober = HealthProber::new(reqwest::Client::new(), health_timeout);
        ServiceRegistry::new(prober, Addressing::FixedHost("127.0.0.1".to_string()))
    }

    /// Parses an in-memory descriptor
    pub fn manifest(raw: &str) -> Result<Manifest, ManifestError> {
        Manifest::parse(Path::new("test/manifest.yaml"), raw)
    }

    /// Short timeouts so failure paths finish quickly in tests
    pub fn fast_timeouts() -> Timeouts {
        Timeouts {
            health_check: Duration::from_millis(500),
            tool_list: Duration::from_millis(500),
            tool_call: Duration::from_millis(500),
            proxy: Duration::from_millis(500),
        }
    }

    /// Gateway over `services_dir` that addresses every backend on 127.0.0.1
    pub fn local_gateway(services_dir: PathBuf, timeouts: &Timeouts) -> Gateway {
        let registry = Arc::new(local_registry(timeouts.health_check));
        Gateway::new(registry, services_dir, reqwest::Client::new(), timeouts)
    }

    /// A localhost port with nothing listening on it
    pub fn closed_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .map(|addr| addr.port())
            .unwrap_or(9)
    }
}
