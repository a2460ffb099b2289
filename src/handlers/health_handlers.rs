//! Gateway liveness, readiness and the live health stream

use crate::gateway::Liveness;
use crate::models::HealthSnapshot;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use serde_json::json;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

const HEALTH_EVENT: &str = "health";

/// Gateway-own liveness
///
/// # Route
///
/// `GET /health`
///
/// Never contacts a backend, so it answers even while discovery is running.
pub async fn gateway_health(State(state): State<AppState>) -> Json<Liveness> {
    Json(state.gateway.liveness())
}

/// `GET /ready` - 200 once discovery and the first health sweep completed
pub async fn gateway_ready(State(state): State<AppState>) -> Response {
    let phase = state.gateway.phase();
    let ready = state.gateway.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "ready": ready,
            "phase": phase,
        })),
    )
        .into_response()
}

/// Probes one registered service right now
///
/// # Route
///
/// `GET /services/{name}/health`
pub async fn service_health(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, crate::error::GatewayError> {
    let result = state.gateway.check_service_health(&name).await?;
    Ok(Json(json!({
        "service": name,
        "health": result,
    }))
    .into_response())
}

/// Server-sent stream of health sweeps
///
/// # Route
///
/// `GET /health/stream`
///
/// The last known health map is sent immediately, then one `health` event per
/// completed sweep. A client that falls behind silently skips sweeps. The
/// stream ends on gateway shutdown.
pub async fn health_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let current = state.gateway.health_snapshot();
    let updates = BroadcastStream::new(state.gateway.subscribe_health()).filter_map(|message| {
        match message {
            Ok(snapshot) => Some(snapshot),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Health stream subscriber lagged");
                None
            }
        }
    });

    let events = tokio_stream::once(current)
        .chain(updates)
        .map(|snapshot: HealthSnapshot| Event::default().event(HEALTH_EVENT).json_data(snapshot));

    let shutdown = state.gateway.shutdown_token().cancelled_owned();
    let events = futures::StreamExt::take_until(events, shutdown);

    Sse::new(events).keep_alive(KeepAlive::default())
}
