//! Service discovery and the in-memory service registry
//!
//! - [`discovery`] - scans a services root for descriptors
//! - [`ServiceRegistry`] - snapshot store with health sweeps and routing
//! - [`HealthProber`] - bounded-timeout HTTP health probes
//!
//! # Example
//!
//! ```rust,no_run
//! use gatehouse::models::Addressing;
//! use gatehouse::registry::{discovery, HealthProber, ServiceRegistry};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let prober = HealthProber::new(reqwest::Client::new(), Duration::from_secs(5));
//! let registry = ServiceRegistry::new(prober, Addressing::ServiceName);
//!
//! registry.register(discovery::discover(Path::new("services"))?);
//! let health = registry.check_all_health().await;
//! let routes = registry.routing_table();
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod health;
pub mod service_registry;

pub use discovery::{discover, discover_with_report, DiscoveryReport};
pub use health::HealthProber;
pub use service_registry::{ServiceMap, ServiceRegistry};
