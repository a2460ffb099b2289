//! In-memory registry of discovered services
//!
//! Holds two snapshots: the service set and the last health sweep. Both are
//! `Arc`-wrapped maps swapped as a whole under a short write lock, so a reader
//! always sees either the previous or the next complete map and never waits
//! on discovery or probing.

use crate::models::{
    Addressing, ApiRoute, CapabilityKind, HealthMap, HealthResult, HealthStatus, Manifest,
    RoutingTable, ServiceType, ToolRoute,
};
use crate::registry::health::HealthProber;
use futures::future::join_all;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registered services keyed by name
pub type ServiceMap = BTreeMap<String, Arc<Manifest>>;

pub struct ServiceRegistry {
    services: RwLock<Arc<ServiceMap>>,
    health_status: RwLock<Arc<HealthMap>>,
    prober: HealthProber,
    addressing: Addressing,
}

impl ServiceRegistry {
    /// Creates an empty registry
    pub fn new(prober: HealthProber, addressing: Addressing) -> Self {
        Self {
            services: RwLock::new(Arc::new(ServiceMap::new())),
            health_status: RwLock::new(Arc::new(HealthMap::new())),
            prober,
            addressing,
        }
    }

    pub fn addressing(&self) -> &Addressing {
        &self.addressing
    }

    /// Replaces the service set
    ///
    /// Duplicate names are a configuration error: the later manifest wins and
    /// the collision is logged. Returns the number of registered services.
    pub fn register(&self, manifests: Vec<Manifest>) -> usize {
        let mut next = ServiceMap::new();
        for manifest in manifests {
            if let Some(previous) = next.get(&manifest.name) {
                warn!(
                    service = %manifest.name,
                    replaced = ?previous.source,
                    by = ?manifest.source,
                    "Duplicate service name, last descriptor wins"
                );
            }
            next.insert(manifest.name.clone(), Arc::new(manifest));
        }

        let count = next.len();
        *self.services.write() = Arc::new(next);
        info!(services = count, "Registry updated");
        count
    }

    /// Current service snapshot
    pub fn services(&self) -> Arc<ServiceMap> {
        self.services.read().clone()
    }

    /// Result of the last completed health sweep
    pub fn health_status(&self) -> Arc<HealthMap> {
        self.health_status.read().clone()
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, name: &str) -> Option<Arc<Manifest>> {
        self.services.read().get(name).map(Arc::clone)
    }

    pub fn by_type(&self, service_type: ServiceType) -> Vec<Arc<Manifest>> {
        self.services()
            .values()
            .filter(|m| m.service_type == service_type)
            .map(Arc::clone)
            .collect()
    }

    pub fn with_capability(&self, kind: CapabilityKind) -> Vec<Arc<Manifest>> {
        self.services()
            .values()
            .filter(|m| m.capabilities.has(kind))
            .map(Arc::clone)
            .collect()
    }

    pub fn api_services(&self) -> Vec<Arc<Manifest>> {
        self.with_capability(CapabilityKind::Api)
    }

    pub fn tool_services(&self) -> Vec<Arc<Manifest>> {
        self.with_capability(CapabilityKind::ToolProvider)
    }

    /// Declared tool names per tool provider, straight from the manifests
    pub fn all_tools(&self) -> BTreeMap<String, Vec<String>> {
        self.services()
            .values()
            .filter(|m| m.has_tool_provider())
            .map(|m| (m.name.clone(), m.declared_tools().to_vec()))
            .collect()
    }

    /// Probes a single service without touching the stored sweep
    pub async fn check_health(&self, name: &str) -> HealthResult {
        match self.get(name) {
            Some(manifest) => {
                let url = self.addressing.health_check_url(&manifest);
                self.prober.check(&manifest, &url).await
            }
            None => HealthResult::not_found(),
        }
    }

    /// Probes every registered service concurrently
    ///
    /// Each probe runs in its own task with its own timeout, so a hung or
    /// panicking probe only affects its own entry. The stored health map is
    /// replaced once all probes have settled, unless the service set was
    /// swapped while the sweep ran. A sweep of a replaced set is still
    /// returned to the caller but never stored.
    pub async fn check_all_health(&self) -> Arc<HealthMap> {
        let services = self.services();

        let handles: Vec<_> = services
            .values()
            .map(|manifest| {
                let manifest = Arc::clone(manifest);
                let prober = self.prober.clone();
                let url = self.addressing.health_check_url(&manifest);
                let name = manifest.name.clone();
                let handle = tokio::spawn(async move { prober.check(&manifest, &url).await });
                (name, handle)
            })
            .collect();

        let (names, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let results = join_all(handles).await;

        let sweep: HealthMap = names
            .into_iter()
            .zip(results)
            .map(|(name, joined)| {
                let result = joined.unwrap_or_else(|e| {
                    warn!(service = %name, error = %e, "Health probe task failed");
                    HealthResult::new(HealthStatus::Error, Some(Value::from(e.to_string())))
                });
                (name, result)
            })
            .collect();

        let healthy = sweep.values().filter(|r| r.is_healthy()).count();
        debug!(total = sweep.len(), healthy, "Health sweep finished");

        let sweep = Arc::new(sweep);
        let current = self.services.read();
        if Arc::ptr_eq(&services, &*current) {
            *self.health_status.write() = Arc::clone(&sweep);
        } else {
            debug!(total = sweep.len(), "Service set changed during sweep, result not stored");
        }
        sweep
    }

    /// Derives the routing table from the current snapshots
    pub fn routing_table(&self) -> RoutingTable {
        let services = self.services();
        let health = self.health_status();
        let mut table = RoutingTable::default();

        for (name, manifest) in services.iter() {
            let host = self.addressing.host(manifest).to_string();

            if let Some(api) = manifest.capabilities.api() {
                let health_url = self.addressing.health_check_url(manifest);
                table.health_endpoints.insert(name.clone(), health_url.clone());
                table.api_services.insert(
                    name.clone(),
                    ApiRoute {
                        host: host.clone(),
                        port: api.port(),
                        endpoints: api.endpoints.clone(),
                        health_url,
                        health: health.get(name).map(|r| r.status),
                    },
                );
            }

            if let Some(tools) = manifest.capabilities.tools() {
                table.tool_services.insert(
                    name.clone(),
                    ToolRoute {
                        host,
                        port: manifest.capabilities.api().map(|api| api.port()),
                        tools: tools.tools.clone(),
                        protocol: tools.protocol.clone(),
                    },
                );
            }
        }

        table
    }
}
