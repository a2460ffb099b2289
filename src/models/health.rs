use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Unreachable,
    Unknown,
    Error,
}

/// Outcome of one health probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    pub checked_at: DateTime<Utc>,
}

impl HealthResult {
    pub fn new(status: HealthStatus, detail: Option<Value>) -> Self {
        Self {
            status,
            latency_ms: None,
            detail,
            checked_at: Utc::now(),
        }
    }

    /// Services without an HTTP API are assumed healthy
    pub fn non_api() -> Self {
        Self::new(HealthStatus::Healthy, Some(Value::from("non-api")))
    }

    pub fn not_found() -> Self {
        Self::new(HealthStatus::Unknown, Some(Value::from("service not found")))
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Complete result of one health sweep, keyed by service name
pub type HealthMap = BTreeMap<String, HealthResult>;

/// One sweep as broadcast to stream subscribers
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub taken_at: DateTime<Utc>,
    pub services: Arc<HealthMap>,
}
