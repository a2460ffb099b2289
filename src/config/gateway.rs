use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Addressing;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Per-call timeouts for outbound requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    pub health_check: Duration,
    pub tool_list: Duration,
    pub tool_call: Duration,
    pub proxy: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            health_check: Duration::from_secs(5),
            tool_list: Duration::from_secs(10),
            tool_call: Duration::from_secs(60),
            proxy: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: IpAddr,
    pub port: u16,
    pub services_dir: PathBuf,
    pub addressing: Addressing,
    /// Zero disables the background health monitor
    pub health_interval: Duration,
    pub timeouts: Timeouts,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            services_dir: PathBuf::from("services"),
            addressing: Addressing::ServiceName,
            health_interval: Duration::from_secs(30),
            timeouts: Timeouts::default(),
        }
    }
}

impl GatewayConfig {
    /// Reads the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key lookup; unset keys keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = match get("GATEWAY_HOST") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "GATEWAY_HOST",
                expected: "an IP address",
                value,
            })?,
            None => defaults.host,
        };

        let port = match get("GATEWAY_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "GATEWAY_PORT",
                expected: "a port number",
                value,
            })?,
            None => defaults.port,
        };

        let services_dir = get("SERVICES_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.services_dir);

        let addressing = match get("SERVICE_HOST_OVERRIDE") {
            Some(host) => Addressing::FixedHost(host.trim().to_string()),
            None => Addressing::ServiceName,
        };

        let secs = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match get(key) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidValue {
                        key,
                        expected: "a whole number of seconds",
                        value,
                    }),
                None => Ok(default),
            }
        };

        let timeouts = Timeouts {
            health_check: secs("HEALTH_CHECK_TIMEOUT_SECS", defaults.timeouts.health_check)?,
            tool_list: secs("TOOL_LIST_TIMEOUT_SECS", defaults.timeouts.tool_list)?,
            tool_call: secs("TOOL_CALL_TIMEOUT_SECS", defaults.timeouts.tool_call)?,
            proxy: secs("PROXY_TIMEOUT_SECS", defaults.timeouts.proxy)?,
        };

        Ok(Self {
            host,
            port,
            services_dir,
            addressing,
            health_interval: secs("HEALTH_CHECK_INTERVAL_SECS", defaults.health_interval)?,
            timeouts,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}
