use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

// Type alias for Result with our GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

/// A service descriptor that could not be turned into a [`Manifest`].
///
/// Always recoverable: discovery logs it and moves on to the next directory.
///
/// [`Manifest`]: crate::models::Manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read descriptor {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode descriptor {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid descriptor {path:?}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

impl ManifestError {
    /// Path of the descriptor that failed
    pub fn path(&self) -> &PathBuf {
        match self {
            ManifestError::Read { path, .. }
            | ManifestError::Decode { path, .. }
            | ManifestError::Invalid { path, .. } => path,
        }
    }
}

/// The services directory itself could not be scanned
#[derive(Debug, Error)]
#[error("Failed to scan services directory {path:?}: {source}")]
pub struct DiscoveryError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Errors surfaced by the gateway control plane
///
/// Single-target operations (tool execution, proxying) return these to the
/// caller; aggregate operations record them per entry instead.
///
/// | Variant            | HTTP status | Error code            |
/// |--------------------|-------------|-----------------------|
/// | ServiceNotFound    | 404         | `service_not_found`   |
/// | BadRequest         | 400         | `invalid_request`     |
/// | CapabilityMismatch | 400         | `capability_mismatch` |
/// | NotImplemented     | 501         | `not_implemented`     |
/// | Unreachable        | 502         | `service_unreachable` |
/// | Protocol           | 502         | `protocol_error`      |
/// | Timeout            | 504         | `timeout`             |
/// | Discovery          | 500         | `discovery_failed`    |
/// | Internal           | 500         | `internal_error`      |
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Service {service} does not provide the {capability} capability")]
    CapabilityMismatch {
        service: String,
        capability: &'static str,
    },

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Service {service} unreachable: {message}")]
    Unreachable { service: String, message: String },

    #[error("Service {service} timed out after {timeout_ms}ms")]
    Timeout { service: String, timeout_ms: u64 },

    #[error("Protocol error from {service}: {message}")]
    Protocol { service: String, message: String },

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Classifies a transport failure from reqwest
    pub fn from_transport(service: &str, err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout {
                service: service.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
        } else {
            GatewayError::Unreachable {
                service: service.to_string(),
                message: err.to_string(),
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::ServiceNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::BadRequest(_) | GatewayError::CapabilityMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            GatewayError::Unreachable { .. } | GatewayError::Protocol { .. } => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Discovery(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::ServiceNotFound(_) => "service_not_found",
            GatewayError::BadRequest(_) => "invalid_request",
            GatewayError::CapabilityMismatch { .. } => "capability_mismatch",
            GatewayError::NotImplemented(_) => "not_implemented",
            GatewayError::Unreachable { .. } => "service_unreachable",
            GatewayError::Protocol { .. } => "protocol_error",
            GatewayError::Timeout { .. } => "timeout",
            GatewayError::Discovery(_) => "discovery_failed",
            GatewayError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Gateway request failed");
        } else {
            tracing::debug!(error = %self, "Gateway request rejected");
        }

        let body = json!({
            "error": self.error_code(),
            "error_description": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::ServiceNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::CapabilityMismatch {
                service: "x".into(),
                capability: "api"
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::NotImplemented("stdio".into()).status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            GatewayError::Timeout {
                service: "x".into(),
                timeout_ms: 10
            }
            .status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_manifest_error_keeps_path() {
        let err = ManifestError::Invalid {
            path: PathBuf::from("services/a/manifest.yaml"),
            reason: "name is empty".into(),
        };
        assert_eq!(err.path(), &PathBuf::from("services/a/manifest.yaml"));
        assert!(err.to_string().contains("name is empty"));
    }
}
