//! HTTP health probing for API services

use crate::models::{HealthResult, HealthStatus, Manifest};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// Issues bounded-timeout GET requests against service health endpoints
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct HealthProber {
    client: reqwest::Client,
    timeout: Duration,
}

impl HealthProber {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probes one service; `url` is its resolved health-check URL
    ///
    /// Services without the API capability are never contacted.
    pub async fn check(&self, manifest: &Manifest, url: &str) -> HealthResult {
        if !manifest.has_api() {
            return HealthResult::non_api();
        }

        let started = Instant::now();
        let response = self.client.get(url).timeout(self.timeout).send().await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                debug!(service = %manifest.name, url = %url, error = %e, "Health probe failed");
                let message = if e.is_timeout() {
                    format!("timed out after {}ms", self.timeout.as_millis())
                } else {
                    e.to_string()
                };
                return HealthResult::new(HealthStatus::Unreachable, Some(Value::from(message)))
                    .with_latency(latency_ms);
            }
        };

        let status = response.status();
        if !status.is_success() {
            return HealthResult::new(
                HealthStatus::Unhealthy,
                Some(Value::from(format!("HTTP {}", status.as_u16()))),
            )
            .with_latency(latency_ms);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("json"))
            .unwrap_or(false);

        let detail = if is_json {
            match tokio::time::timeout(self.timeout, response.json::<Value>()).await {
                Ok(Ok(body)) => Some(body),
                _ => None,
            }
        } else {
            None
        };

        HealthResult::new(HealthStatus::Healthy, detail).with_latency(latency_ms)
    }
}
