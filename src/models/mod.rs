pub mod addressing;
pub mod health;
pub mod manifest;
pub mod routing;
pub mod summary;

pub use addressing::Addressing;
pub use health::{HealthMap, HealthResult, HealthSnapshot, HealthStatus};
pub use manifest::{
    ApiCapability, Capabilities, CapabilityKind, Command, Dependencies, Deployment, Manifest,
    ServiceType, ToolCapability,
};
pub use routing::{ApiRoute, RoutingTable, ToolRoute};
pub use summary::{
    ApiServiceSummary, CapabilityFlags, ManifestSummary, ServiceSummary, ToolServiceSummary,
};
