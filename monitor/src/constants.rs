//! Central repository for intervals, retry policy, chain endpoints and metric names
//!
//! This module organizes constants by category so the defaults used by the
//! config layer, the polling loop and the registration supervisor live in one place.

use std::time::Duration;

/// Default configuration values
pub mod defaults {
    /// Default node display name when neither config nor $HOSTNAME provide one
    pub const NODE_NAME: &str = "parity";

    /// Default poll interval in seconds
    pub const POLL_INTERVAL_SECONDS: u64 = 5;

    /// Default RPC timeout in seconds
    pub const RPC_TIMEOUT_SECONDS: u64 = 10;

    /// Default maximum lag (in blocks) still considered synced
    pub const SYNC_THRESHOLD: u64 = 5;

    /// Default bind address for the health endpoint
    pub const BIND_ADDR: &str = "127.0.0.1";

    /// Default bind port for the health endpoint
    pub const BIND_PORT: u16 = 4647;

    /// Default Prometheus namespace
    pub const METRICS_NAMESPACE: &str = "parity_pool";
}

/// Service registry (Consul) constants
pub mod registry {
    use super::Duration;

    /// Default Consul agent address
    pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8500";

    /// Default service name advertised to Consul
    pub const DEFAULT_SERVICE_NAME: &str = "parity";

    /// Port of the node's RPC, advertised as the service port
    pub const DEFAULT_SERVICE_PORT: u16 = 8545;

    /// Interval at which Consul polls the health check
    pub const DEFAULT_CHECK_INTERVAL: &str = "1s";

    /// Timeout Consul applies to the health check
    pub const DEFAULT_CHECK_TIMEOUT: &str = "5s";

    /// Maximum registration attempts before giving up
    pub const MAX_ATTEMPTS: u32 = 5;

    /// Sleep between failed registration attempts
    pub const RETRY_BACKOFF: Duration = Duration::from_secs(60);

    /// Timeout for a single registration request
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Path served by the web layer and polled by Consul
    pub const HEALTH_CHECK_PATH: &str = "/synced";
}

/// Chain identities accepted from the node and their explorer endpoints
pub mod chains {
    pub const KOVAN: &str = "kovan";
    pub const FOUNDATION: &str = "foundation";

    pub const KOVAN_EXPLORER_URL: &str =
        "https://kovan.etherscan.io/api?module=proxy&action=eth_blockNumber";
    pub const FOUNDATION_EXPLORER_URL: &str =
        "https://api.etherscan.io/api?module=proxy&action=eth_blockNumber";
}

/// Polling loop constants
pub mod polling {
    /// Consecutive unsupported-chain failures before the diagnostic escalates to error level
    pub const UNSUPPORTED_CHAIN_ESCALATION: u32 = 10;
}

/// Gauge names emitted by a gathering round
pub mod gauges {
    pub const PEERS: &str = "peers";
    pub const BLOCK_NUMBER: &str = "blockNumber";
    pub const BLOCK_TIME: &str = "blocktime";
    pub const BLOCKS_BEHIND: &str = "blocksbehind";
    pub const SYNCED: &str = "synced";

    /// Label carrying the node identity on every gauge
    pub const NODE_LABEL: &str = "node";
}
