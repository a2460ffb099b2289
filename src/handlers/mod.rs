//! HTTP handlers for the gateway surface
//!
//! Every handler is a thin adapter over [`Gateway`](crate::gateway::Gateway);
//! errors are rendered by [`GatewayError`](crate::error::GatewayError).

pub mod discovery_handlers;
pub mod health_handlers;
pub mod proxy_handlers;
pub mod service_handlers;
pub mod tool_handlers;

pub use discovery_handlers::{discovery_overview, refresh_discovery, routing_table};
pub use health_handlers::{gateway_health, gateway_ready, health_stream, service_health};
pub use proxy_handlers::proxy_request;
pub use service_handlers::{list_api_services, list_services, list_tool_services};
pub use tool_handlers::{execute_tool, list_tools};
