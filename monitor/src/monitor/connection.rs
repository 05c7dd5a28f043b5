//! Logical connection to the node and chain identity resolution

use std::sync::Arc;
use tracing::{error, info};

use super::state::Chain;
use crate::constants::polling::UNSUPPORTED_CHAIN_ESCALATION;
use crate::errors::ConnectError;
use crate::explorer::{ExplorerClient, ExplorerFactory};
use crate::rpc::NodeClient;

/// Resources bound to one successful connection; dropped on disconnect
#[derive(Clone)]
pub struct Connection {
    pub chain: Chain,
    pub explorer: Arc<dyn ExplorerClient>,
}

pub struct ConnectionSupervisor {
    node: Arc<dyn NodeClient>,
    explorer_factory: ExplorerFactory,
    // Consecutive attempts that reported the same unsupported chain
    unsupported_streak: u32,
    last_unsupported: Option<String>,
}

impl ConnectionSupervisor {
    pub fn new(node: Arc<dyn NodeClient>, explorer_factory: ExplorerFactory) -> Self {
        Self {
            node,
            explorer_factory,
            unsupported_streak: 0,
            last_unsupported: None,
        }
    }

    /// Probe the node's chain identity and bind an explorer for it.
    /// No retry happens here; the polling loop calls again on its next tick.
    pub async fn try_connect(&mut self) -> Result<Connection, ConnectError> {
        let chain_id = match self.node.chain_id().await {
            Ok(id) => id,
            Err(e) => {
                self.clear_streak();
                return Err(ConnectError::Node(e));
            }
        };

        let Some(chain) = Chain::from_node_id(&chain_id) else {
            self.record_unsupported(&chain_id);
            return Err(ConnectError::UnsupportedChain(chain_id));
        };

        self.clear_streak();
        let explorer = (self.explorer_factory)(chain).map_err(ConnectError::Explorer)?;
        info!("Using chain {}", chain);

        Ok(Connection { chain, explorer })
    }

    pub fn unsupported_streak(&self) -> u32 {
        self.unsupported_streak
    }

    fn clear_streak(&mut self) {
        self.unsupported_streak = 0;
        self.last_unsupported = None;
    }

    fn record_unsupported(&mut self, chain_id: &str) {
        if self.last_unsupported.as_deref() == Some(chain_id) {
            self.unsupported_streak += 1;
        } else {
            self.unsupported_streak = 1;
            self.last_unsupported = Some(chain_id.to_string());
        }

        if self
            .unsupported_streak
            .is_multiple_of(UNSUPPORTED_CHAIN_ESCALATION)
        {
            error!(
                "Node has reported unsupported chain '{}' {} times in a row; check the node's --chain setting",
                chain_id, self.unsupported_streak
            );
        }
    }
}
