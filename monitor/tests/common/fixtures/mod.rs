//! This module provides reusable test utilities:
//! - Mock HTTP servers (node JSON-RPC, Etherscan, Consul)
//! - In-memory fakes for the collaborator traits
//! - Test configuration builders

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fakes;
pub mod test_config;

// Re-export commonly used items
pub use fakes::*;
pub use mock_consul::MockConsulServer;
pub use mock_explorer::MockExplorerServer;
pub use mock_rpc::MockRpcServer;
pub use test_config::TestConfigBuilder;
