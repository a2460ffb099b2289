use crate::error::GatewayError;
use crate::gateway::{DiscoveryOutcome, DiscoveryOverview};
use crate::models::RoutingTable;
use crate::AppState;
use axum::{extract::State, Json};

/// `GET /discovery` - every registered manifest, without probing anything
pub async fn discovery_overview(State(state): State<AppState>) -> Json<DiscoveryOverview> {
    Json(state.gateway.discovery_overview())
}

/// Re-scans the services directory and swaps in the new service set
///
/// # Route
///
/// `POST /discovery/refresh`
///
/// # Returns
///
/// * `200` - counts of registered services and per-descriptor failures
/// * `500` - the services directory itself could not be read; the previous
///   service set is kept
pub async fn refresh_discovery(
    State(state): State<AppState>,
) -> Result<Json<DiscoveryOutcome>, GatewayError> {
    let outcome = state.gateway.discover().await?;
    tracing::info!(
        services = outcome.services,
        failures = outcome.failures.len(),
        "Re-discovery complete"
    );
    Ok(Json(outcome))
}

/// `GET /routing`
pub async fn routing_table(State(state): State<AppState>) -> Json<RoutingTable> {
    Json(state.gateway.routing_table())
}
