pub mod health_monitor;
pub mod jsonrpc;
pub mod proxy;
pub mod tool_catalog;
pub mod tool_executor;

pub use health_monitor::{spawn_health_monitor, HealthBroadcast};
pub use jsonrpc::{JsonRpcRequest, JsonRpcResponse, RpcClient};
pub use proxy::{strip_gateway_prefix, ProxyRequest, ProxyResponse, ServiceProxy};
pub use tool_catalog::{CatalogEntry, FailureKind, ToolCatalog, ToolCatalogService, ToolInfo};
pub use tool_executor::ToolExecutor;
