use crate::error::GatewayError;
use crate::services::proxy::{strip_gateway_prefix, ProxyRequest};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

/// Forwards any request under `/proxy/{service}` to that service's API
///
/// # Route
///
/// `ANY /proxy/{service}` and `ANY /proxy/{service}/{*path}`
///
/// The backend response is relayed as-is, including non-2xx statuses. Only
/// gateway-side failures (unknown service, transport error, timeout) produce
/// a gateway error body.
pub async fn proxy_request(
    Path(params): Path<HashMap<String, String>>,
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let service = params
        .get("service")
        .cloned()
        .ok_or_else(|| GatewayError::BadRequest("missing service name".to_string()))?;

    let request = ProxyRequest {
        method,
        path: strip_gateway_prefix(uri.path()),
        query: uri.query().map(str::to_string),
        headers,
        body,
    };

    let response = state.gateway.proxy(&service, request).await?;
    Ok((response.status, response.headers, response.body).into_response())
}
