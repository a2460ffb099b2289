//! Gateway control plane
//!
//! [`Gateway`] owns the one [`ServiceRegistry`] of the process and every
//! outbound client. HTTP handlers and the background health monitor all reach
//! backends through it.
//!
//! # Lifecycle
//!
//! ```text
//! starting ──> discovering ──> ready
//!                  ^             │
//!                  └─────────────┘  (re-discovery)
//! ```
//!
//! A pass only reaches `ready` after the new service set has been registered
//! and swept once.

use crate::config::{GatewayConfig, Timeouts};
use crate::error::GatewayError;
use crate::models::{
    ApiServiceSummary, HealthMap, HealthResult, HealthSnapshot, ManifestSummary, RoutingTable,
    ServiceSummary, ToolServiceSummary,
};
use crate::registry::{self, HealthProber, ServiceRegistry};
use crate::services::health_monitor::HealthBroadcast;
use crate::services::proxy::{ProxyRequest, ProxyResponse, ServiceProxy};
use crate::services::tool_catalog::{ToolCatalog, ToolCatalogService};
use crate::services::tool_executor::ToolExecutor;
use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayPhase {
    Starting,
    Discovering,
    Ready,
}

/// Gateway-own status, independent of any backend
#[derive(Debug, Clone, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub phase: GatewayPhase,
    pub services: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of one discovery pass
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryOutcome {
    pub services: usize,
    pub failures: Vec<DiscoveryFailure>,
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryOverview {
    pub phase: GatewayPhase,
    pub services_dir: PathBuf,
    pub total: usize,
    pub services: BTreeMap<String, ManifestSummary>,
}

pub struct Gateway {
    registry: Arc<ServiceRegistry>,
    services_dir: PathBuf,
    phase: RwLock<GatewayPhase>,
    swept_once: AtomicBool,
    discovery_lock: Mutex<()>,
    catalog: ToolCatalogService,
    executor: ToolExecutor,
    proxy: ServiceProxy,
    health_events: HealthBroadcast,
    shutdown: CancellationToken,
}

impl Gateway {
    /// Builds a gateway around an existing registry
    pub fn new(
        registry: Arc<ServiceRegistry>,
        services_dir: PathBuf,
        client: reqwest::Client,
        timeouts: &Timeouts,
    ) -> Self {
        Self {
            registry,
            services_dir,
            phase: RwLock::new(GatewayPhase::Starting),
            swept_once: AtomicBool::new(false),
            discovery_lock: Mutex::new(()),
            catalog: ToolCatalogService::new(client.clone(), timeouts.tool_list),
            executor: ToolExecutor::new(client.clone(), timeouts.tool_call),
            proxy: ServiceProxy::new(client, timeouts.proxy),
            health_events: HealthBroadcast::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Builds the registry, HTTP client and gateway from configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gatehouse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let prober = HealthProber::new(client.clone(), config.timeouts.health_check);
        let registry = Arc::new(ServiceRegistry::new(prober, config.addressing.clone()));

        Ok(Self::new(
            registry,
            config.services_dir.clone(),
            client,
            &config.timeouts,
        ))
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Cancelled when the process shuts down; ends monitors and open streams
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn phase(&self) -> GatewayPhase {
        *self.phase.read()
    }

    /// True once a discovery pass and its health sweep have completed
    ///
    /// Stays true while a later re-discovery runs, since the previous
    /// service set keeps serving traffic.
    pub fn is_ready(&self) -> bool {
        self.swept_once.load(Ordering::Acquire)
    }

    fn set_phase(&self, phase: GatewayPhase) {
        *self.phase.write() = phase;
        info!(phase = ?phase, "Gateway phase changed");
    }

    pub fn liveness(&self) -> Liveness {
        Liveness {
            status: "ok",
            phase: self.phase(),
            services: self.registry.len(),
        }
    }

    /// Scans the services directory, replaces the registry and sweeps health
    ///
    /// Used both at startup and for explicit re-discovery. Concurrent calls
    /// run one after the other. If the directory cannot be scanned the
    /// previous service set stays in place.
    pub async fn discover(&self) -> Result<DiscoveryOutcome, GatewayError> {
        let _guard = self.discovery_lock.lock().await;
        let previous = self.phase();
        self.set_phase(GatewayPhase::Discovering);

        let dir = self.services_dir.clone();
        let scanned = tokio::task::spawn_blocking(move || registry::discover_with_report(&dir))
            .await
            .map_err(|e| GatewayError::Internal(format!("Discovery task failed: {}", e)));

        let report = match scanned {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                self.set_phase(previous);
                return Err(e.into());
            }
            Err(e) => {
                self.set_phase(previous);
                return Err(e);
            }
        };

        let failures = report
            .failures
            .iter()
            .map(|e| DiscoveryFailure {
                path: e.path().clone(),
                error: e.to_string(),
            })
            .collect();

        let services = self.registry.register(report.manifests);
        self.refresh_health().await;
        self.swept_once.store(true, Ordering::Release);
        self.set_phase(GatewayPhase::Ready);

        Ok(DiscoveryOutcome {
            services,
            failures,
            skipped: report.skipped,
        })
    }

    /// Runs a full health sweep and publishes it to stream subscribers
    pub async fn refresh_health(&self) -> Arc<HealthMap> {
        let sweep = self.registry.check_all_health().await;
        self.health_events.publish(HealthSnapshot {
            taken_at: Utc::now(),
            services: Arc::clone(&sweep),
        });
        sweep
    }

    pub fn subscribe_health(&self) -> broadcast::Receiver<HealthSnapshot> {
        self.health_events.subscribe()
    }

    pub fn health_snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            taken_at: Utc::now(),
            services: self.registry.health_status(),
        }
    }

    pub async fn check_service_health(&self, name: &str) -> Result<HealthResult, GatewayError> {
        if self.registry.get(name).is_none() {
            return Err(GatewayError::ServiceNotFound(name.to_string()));
        }
        Ok(self.registry.check_health(name).await)
    }

    pub fn discovery_overview(&self) -> DiscoveryOverview {
        let services = self.registry.services();
        DiscoveryOverview {
            phase: self.phase(),
            services_dir: self.services_dir.clone(),
            total: services.len(),
            services: services
                .iter()
                .map(|(name, m)| (name.clone(), ManifestSummary::from(m.as_ref())))
                .collect(),
        }
    }

    pub fn routing_table(&self) -> RoutingTable {
        self.registry.routing_table()
    }

    /// Every service with freshly probed health
    pub async fn list_services(&self) -> BTreeMap<String, ServiceSummary> {
        let health = self.refresh_health().await;
        self.registry
            .services()
            .iter()
            .map(|(name, m)| {
                let summary = ServiceSummary::new(m, health.get(name).cloned());
                (name.clone(), summary)
            })
            .collect()
    }

    pub fn list_api_services(&self) -> BTreeMap<String, ApiServiceSummary> {
        let health = self.registry.health_status();
        let addressing = self.registry.addressing();

        self.registry
            .api_services()
            .into_iter()
            .map(|m| {
                let summary = ApiServiceSummary {
                    version: m.version.clone(),
                    description: m.description.clone(),
                    url: addressing.base_url(&m),
                    port: m.api_port(),
                    endpoints: m.declared_endpoints().to_vec(),
                    health: health.get(&m.name).map(|r| r.status),
                };
                (m.name.clone(), summary)
            })
            .collect()
    }

    pub fn list_tool_services(&self) -> BTreeMap<String, ToolServiceSummary> {
        let health = self.registry.health_status();
        let addressing = self.registry.addressing();

        self.registry
            .tool_services()
            .into_iter()
            .map(|m| {
                let summary = ToolServiceSummary {
                    version: m.version.clone(),
                    description: m.description.clone(),
                    url: m.has_api().then(|| addressing.base_url(&m)),
                    protocol: m.tool_protocol().unwrap_or_default().to_string(),
                    tools: m.declared_tools().to_vec(),
                    health: health.get(&m.name).map(|r| r.status),
                };
                (m.name.clone(), summary)
            })
            .collect()
    }

    pub async fn list_all_tools(&self) -> ToolCatalog {
        self.catalog.list_all_tools(&self.registry).await
    }

    pub async fn execute_tool(
        &self,
        service: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, GatewayError> {
        self.executor
            .execute(&self.registry, service, tool, arguments)
            .await
            .inspect_err(|e| warn!(service = %service, tool = %tool, error = %e, "Tool execution failed"))
    }

    pub async fn proxy(
        &self,
        service: &str,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, GatewayError> {
        self.proxy.forward(&self.registry, service, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{tool_manifest, write_service};
    use crate::test_utils::test_helpers::{fast_timeouts, local_gateway};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_discover_registers_and_becomes_ready() {
        let root = TempDir::new().unwrap();
        write_service(root.path(), "svc-b", &tool_manifest("svc-b", &["t1"])).unwrap();
        let gateway = local_gateway(root.path().to_path_buf(), &fast_timeouts());
        assert_eq!(gateway.phase(), GatewayPhase::Starting);

        let outcome = gateway.discover().await.unwrap();

        assert_eq!(outcome.services, 1);
        assert_eq!(gateway.phase(), GatewayPhase::Ready);
        assert!(gateway.is_ready());
        assert_eq!(gateway.liveness().services, 1);
        assert!(gateway.registry().health_status().contains_key("svc-b"));
    }

    #[tokio::test]
    async fn test_unreadable_root_keeps_previous_state() {
        let root = TempDir::new().unwrap();
        let not_a_dir = root.path().join("services");
        std::fs::write(&not_a_dir, "plain file").unwrap();
        let gateway = local_gateway(not_a_dir, &fast_timeouts());

        let err = gateway.discover().await.unwrap_err();

        assert!(matches!(err, GatewayError::Discovery(_)));
        assert_eq!(gateway.phase(), GatewayPhase::Starting);
        assert!(!gateway.is_ready());
        assert!(gateway.registry().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_service_health_is_not_found() {
        let root = TempDir::new().unwrap();
        let gateway = local_gateway(root.path().to_path_buf(), &fast_timeouts());

        let err = gateway.check_service_health("ghost").await.unwrap_err();

        assert!(matches!(err, GatewayError::ServiceNotFound(_)));
    }
}
