pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<gateway::Gateway>,
}

impl AppState {
    pub fn new(gateway: Arc<gateway::Gateway>) -> Self {
        Self { gateway }
    }
}
