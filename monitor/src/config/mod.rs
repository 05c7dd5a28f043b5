pub mod manager;

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

use crate::constants::{defaults, registry};
use crate::errors::ConfigError;
pub use manager::ConfigManager;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_node_name")]
    pub node_name: String,
    pub endpoint: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_seconds: u64,
    #[serde(default = "default_sync_threshold")]
    pub sync_threshold: u64,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,
    #[serde(default = "default_metrics_namespace")]
    pub metrics_namespace: String,
    // Registration is skipped entirely when absent
    pub consul: Option<ConsulConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsulConfig {
    #[serde(default = "default_consul_address")]
    pub address: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_service_port")]
    pub service_port: u16,
    #[serde(default = "default_check_interval")]
    pub check_interval: String,
    #[serde(default = "default_check_timeout")]
    pub check_timeout: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_seconds: u64,
}

fn default_node_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| defaults::NODE_NAME.to_string())
}

fn default_poll_interval() -> u64 {
    defaults::POLL_INTERVAL_SECONDS
}

fn default_rpc_timeout() -> u64 {
    defaults::RPC_TIMEOUT_SECONDS
}

fn default_sync_threshold() -> u64 {
    defaults::SYNC_THRESHOLD
}

fn default_bind_addr() -> String {
    defaults::BIND_ADDR.to_string()
}

fn default_bind_port() -> u16 {
    defaults::BIND_PORT
}

fn default_metrics_namespace() -> String {
    defaults::METRICS_NAMESPACE.to_string()
}

fn default_consul_address() -> String {
    registry::DEFAULT_ADDRESS.to_string()
}

fn default_service_name() -> String {
    registry::DEFAULT_SERVICE_NAME.to_string()
}

fn default_service_port() -> u16 {
    registry::DEFAULT_SERVICE_PORT
}

fn default_check_interval() -> String {
    registry::DEFAULT_CHECK_INTERVAL.to_string()
}

fn default_check_timeout() -> String {
    registry::DEFAULT_CHECK_TIMEOUT.to_string()
}

fn default_max_attempts() -> u32 {
    registry::MAX_ATTEMPTS
}

fn default_retry_backoff() -> u64 {
    registry::RETRY_BACKOFF.as_secs()
}

impl Config {
    /// Reject values the monitor cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "node_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "endpoint".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.poll_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.bind_addr.parse::<IpAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "bind_addr".to_string(),
                reason: format!("'{}' is not a valid ip", self.bind_addr),
            });
        }

        if let Some(consul) = &self.consul {
            if consul.max_attempts == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "consul.max_attempts".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }

    /// Address the health endpoint listens on, `ip:port`
    pub fn health_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.bind_port)
    }

    /// URL the registry polls to decide whether this node is healthy
    pub fn health_check_url(&self) -> String {
        format!(
            "http://{}{}",
            self.health_addr(),
            registry::HEALTH_CHECK_PATH
        )
    }
}

impl ConsulConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_seconds)
    }
}
