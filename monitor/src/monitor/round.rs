//! One metrics-gathering round
//!
//! Every independent query is attempted even when an earlier one failed; the
//! failures are collected into a [`RoundReport`] instead of short-circuiting.

use std::fmt;
use tracing::info;

use super::state::MonitorState;
use crate::constants::gauges;
use crate::errors::{ExplorerError, NodeError};
use crate::explorer::ExplorerClient;
use crate::metrics::{Labels, MetricsSink};
use crate::rpc::NodeClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStep {
    Peers,
    BlockNumber,
    Block,
    Explorer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundCause {
    Node(NodeError),
    Explorer(ExplorerError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundError {
    pub step: RoundStep,
    pub cause: RoundCause,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RoundReport {
    pub errors: Vec<RoundError>,
    /// Signed lag (`remote - local`) when the explorer comparison succeeded
    pub blocks_behind: Option<i128>,
    /// New sync classification when it flipped during this round
    pub sync_transition: Option<bool>,
}

impl RoundReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when any node query failed because the connection was refused
    pub fn is_connection_refused(&self) -> bool {
        self.errors.iter().any(|e| match &e.cause {
            RoundCause::Node(node) => node.is_connection_refused(),
            RoundCause::Explorer(_) => false,
        })
    }

    pub fn failed(&self, step: RoundStep) -> bool {
        self.errors.iter().any(|e| e.step == step)
    }

    fn push(&mut self, step: RoundStep, cause: RoundCause) {
        self.errors.push(RoundError { step, cause });
    }
}

impl fmt::Display for RoundStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundStep::Peers => "peers",
            RoundStep::BlockNumber => "block number",
            RoundStep::Block => "block",
            RoundStep::Explorer => "explorer",
        };
        f.write_str(name)
    }
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            RoundCause::Node(e) => write!(f, "{}: {}", self.step, e),
            RoundCause::Explorer(e) => write!(f, "{}: {}", self.step, e),
        }
    }
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) occurred:", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n\t* {}", error)?;
        }
        Ok(())
    }
}

pub struct GatheringRound<'a> {
    pub node: &'a dyn NodeClient,
    pub explorer: &'a dyn ExplorerClient,
    pub sink: &'a dyn MetricsSink,
    pub labels: &'a Labels,
    pub sync_threshold: u64,
}

impl GatheringRound<'_> {
    pub async fn run(&self, state: &mut MonitorState) -> RoundReport {
        let mut report = RoundReport::default();

        // Peers
        match self.node.peer_count().await {
            Ok(peers) => self.gauge(gauges::PEERS, peers as f64),
            Err(e) => report.push(RoundStep::Peers, RoundCause::Node(e)),
        }

        // Block number; the remaining steps need it
        let block_number = match self.node.current_block_number().await {
            Ok(number) => {
                self.gauge(gauges::BLOCK_NUMBER, number as f64);
                number
            }
            Err(e) => {
                report.push(RoundStep::BlockNumber, RoundCause::Node(e));
                return report;
            }
        };

        // Block
        match self.node.block_by_number(block_number).await {
            Ok(block) => {
                if let Some(last) = &state.last_block {
                    self.gauge(gauges::BLOCK_TIME, block.seconds_since(last));
                }
                state.last_block = Some(block);
            }
            Err(e) => report.push(RoundStep::Block, RoundCause::Node(e)),
        }

        // Explorer
        match self.explorer.remote_block_number().await {
            Ok(remote) => {
                let behind = i128::from(remote) - i128::from(block_number);
                report.blocks_behind = Some(behind);
                self.gauge(gauges::BLOCKS_BEHIND, behind as f64);

                let lag = u64::try_from(behind.unsigned_abs()).unwrap_or(u64::MAX);
                if state.sync.update(lag, self.sync_threshold) {
                    info!("State changed. Is synced?: {}", state.synced());
                    report.sync_transition = Some(state.synced());
                }
                self.gauge(gauges::SYNCED, if state.synced() { 1.0 } else { 0.0 });
            }
            Err(e) => report.push(RoundStep::Explorer, RoundCause::Explorer(e)),
        }

        report
    }

    fn gauge(&self, name: &str, value: f64) {
        self.sink.set_gauge(name, self.labels, value);
    }
}
