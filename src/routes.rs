//! Route table for the gateway HTTP surface

use crate::{handlers, AppState};
use axum::{
    http::header,
    routing::{any, get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    // Proxied backends decide their own CORS policy; this only covers the
    // gateway's own endpoints.
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CACHE_CONTROL,
        ])
        .max_age(Duration::from_secs(3600));

    let control_routes = Router::new()
        .route("/health", get(handlers::gateway_health))
        .route("/health/stream", get(handlers::health_stream))
        .route("/ready", get(handlers::gateway_ready))
        .route("/discovery", get(handlers::discovery_overview))
        .route("/discovery/refresh", post(handlers::refresh_discovery))
        .route("/routing", get(handlers::routing_table))
        .route("/services", get(handlers::list_services))
        .route("/services/api", get(handlers::list_api_services))
        .route("/services/tools", get(handlers::list_tool_services))
        .route("/services/{name}/health", get(handlers::service_health))
        .route("/tools", get(handlers::list_tools))
        .route("/tools/{service}/{tool}", post(handlers::execute_tool))
        .layer(cors_layer);

    let proxy_routes = Router::new()
        .route("/proxy/{service}", any(handlers::proxy_request))
        .route("/proxy/{service}/{*path}", any(handlers::proxy_request));

    Router::new()
        .merge(control_routes)
        .merge(proxy_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
