pub mod config;
pub mod constants;
pub mod errors;
pub mod explorer;
pub mod metrics;
pub mod monitor;
pub mod registry;
pub mod rpc;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigManager, ConsulConfig};
pub use explorer::{EtherscanClient, ExplorerClient};
pub use metrics::{MetricsSink, PrometheusSink};
pub use monitor::{HealthFlags, Monitor};
pub use registry::{ConsulClient, RegistrationSupervisor, RegistryClient};
pub use rpc::{EthRpcClient, NodeClient};
