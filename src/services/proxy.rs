//! Generic HTTP proxying to API services
//!
//! Requests arriving at `/proxy/{service}/{rest}` are forwarded to
//! `http://{host}:{port}/{rest}` with method, query string, headers and body
//! intact. The backend's status, headers and body are relayed unchanged.
//!
//! # Example
//!
//! ```rust,no_run
//! use gatehouse::services::proxy::{ProxyRequest, ServiceProxy};
//! use gatehouse::registry::ServiceRegistry;
//! use axum::body::Bytes;
//! use axum::http::{HeaderMap, Method};
//! use std::time::Duration;
//!
//! # async fn example(registry: &ServiceRegistry) -> Result<(), Box<dyn std::error::Error>> {
//! let proxy = ServiceProxy::new(reqwest::Client::new(), Duration::from_secs(30));
//!
//! let request = ProxyRequest {
//!     method: Method::GET,
//!     path: "/items".to_string(),
//!     query: Some("limit=10".to_string()),
//!     headers: HeaderMap::new(),
//!     body: Bytes::new(),
//! };
//!
//! let response = proxy.forward(registry, "inventory", request).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

use crate::error::GatewayError;
use crate::registry::ServiceRegistry;
use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Path prefix under which the gateway exposes proxied services
pub const PROXY_PREFIX: &str = "/proxy";

/// Connection-scoped headers that must not be copied between hops
const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    header::HOST,
    header::CONTENT_LENGTH,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Path relative to the backend root, always starting with `/`
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Removes `/proxy/{service}` from an incoming raw path
///
/// The service segment is dropped as it appears on the wire, so a
/// percent-encoded service name is stripped like a plain one. The rest of
/// the path keeps its original encoding. An empty remainder becomes `/`.
pub fn strip_gateway_prefix(path: &str) -> String {
    let remainder = path
        .strip_prefix(PROXY_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(|rest| rest.find('/').map_or("", |slash| &rest[slash..]))
        .unwrap_or(path);

    if remainder.is_empty() {
        "/".to_string()
    } else if remainder.starts_with('/') {
        remainder.to_string()
    } else {
        format!("/{}", remainder)
    }
}

fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    for name in HOP_BY_HOP.iter() {
        forwarded.remove(name);
    }
    forwarded
}

#[derive(Clone)]
pub struct ServiceProxy {
    client: reqwest::Client,
    timeout: Duration,
}

impl ServiceProxy {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Forwards `request` to the API of `service`
    ///
    /// # Errors
    ///
    /// * `ServiceNotFound` - unknown service, or one without an API
    /// * `Timeout` / `Unreachable` - the backend could not be reached in time
    pub async fn forward(
        &self,
        registry: &ServiceRegistry,
        service: &str,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, GatewayError> {
        let manifest = registry
            .get(service)
            .filter(|m| m.has_api())
            .ok_or_else(|| GatewayError::ServiceNotFound(service.to_string()))?;

        let mut url = format!("{}{}", registry.addressing().base_url(&manifest), request.path);
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }

        debug!(service = %service, method = %request.method, url = %url, "Proxying request");

        let response = self
            .client
            .request(request.method, &url)
            .headers(end_to_end_headers(&request.headers))
            .body(request.body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(service, e, self.timeout))?;

        let status = response.status();
        let headers = end_to_end_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::from_transport(service, e, self.timeout))?;

        Ok(ProxyResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_gateway_prefix() {
        assert_eq!(strip_gateway_prefix("/proxy/svc-a/items/1"), "/items/1");
        assert_eq!(strip_gateway_prefix("/proxy/svc-a"), "/");
        assert_eq!(strip_gateway_prefix("/proxy/svc-a/"), "/");
    }

    #[test]
    fn test_strip_gateway_prefix_uses_raw_segment() {
        assert_eq!(strip_gateway_prefix("/proxy/svc%2Da/x"), "/x");
        assert_eq!(strip_gateway_prefix("/proxy/svc-a/a%20b"), "/a%20b");
        assert_eq!(strip_gateway_prefix("/proxy/svc-ab/items"), "/items");
    }

    #[test]
    fn test_hop_by_hop_headers_removed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "gateway:8080".parse().unwrap());
        headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        headers.insert("x-request-id", "42".parse().unwrap());

        let forwarded = end_to_end_headers(&headers);

        assert!(forwarded.get(header::HOST).is_none());
        assert!(forwarded.get(header::CONNECTION).is_none());
        assert_eq!(forwarded.get(header::AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(forwarded.get("x-request-id").unwrap(), "42");
    }
}
