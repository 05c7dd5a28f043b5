//! Test configuration builders

use node_monitor::config::{Config, ConsulConfig};

pub struct TestConfigBuilder {
    config: Config,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config {
                node_name: "test-node".to_string(),
                endpoint: "http://127.0.0.1:8545".to_string(),
                poll_interval_seconds: 5,
                rpc_timeout_seconds: 2,
                sync_threshold: 5,
                bind_addr: "127.0.0.1".to_string(),
                bind_port: 4647,
                metrics_namespace: "parity_pool".to_string(),
                consul: None,
            },
        }
    }

    pub fn node_name(mut self, name: &str) -> Self {
        self.config.node_name = name.to_string();
        self
    }

    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.config.endpoint = endpoint.to_string();
        self
    }

    pub fn sync_threshold(mut self, threshold: u64) -> Self {
        self.config.sync_threshold = threshold;
        self
    }

    pub fn poll_interval_seconds(mut self, seconds: u64) -> Self {
        self.config.poll_interval_seconds = seconds;
        self
    }

    pub fn with_consul(mut self, address: &str) -> Self {
        self.config.consul = Some(ConsulConfig {
            address: address.to_string(),
            service_name: "parity".to_string(),
            tags: vec!["mainnet".to_string()],
            service_port: 8545,
            check_interval: "1s".to_string(),
            check_timeout: "5s".to_string(),
            max_attempts: 5,
            retry_backoff_seconds: 60,
        });
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
