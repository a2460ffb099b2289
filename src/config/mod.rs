pub mod gateway;

pub use gateway::{ConfigError, GatewayConfig, Timeouts};
