use crate::models::{ApiServiceSummary, ServiceSummary, ToolServiceSummary};
use crate::AppState;
use axum::{extract::State, Json};
use std::collections::BTreeMap;

/// Lists every service with freshly probed health
///
/// # Route
///
/// `GET /services`
///
/// Runs a full health sweep before answering, so latency is bounded by the
/// health check timeout rather than the number of services.
pub async fn list_services(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, ServiceSummary>> {
    Json(state.gateway.list_services().await)
}

/// `GET /services/api` - API-capable services with their last known health
pub async fn list_api_services(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, ApiServiceSummary>> {
    Json(state.gateway.list_api_services())
}

/// `GET /services/tools`
pub async fn list_tool_services(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, ToolServiceSummary>> {
    Json(state.gateway.list_tool_services())
}
