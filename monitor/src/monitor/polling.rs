use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::connection::{Connection, ConnectionSupervisor};
use super::round::{GatheringRound, RoundReport};
use super::state::{Chain, HealthFlags, MonitorState};
use crate::config::Config;
use crate::constants::gauges;
use crate::errors::ConnectError;
use crate::explorer::ExplorerFactory;
use crate::metrics::{Labels, MetricsSink};
use crate::rpc::NodeClient;

/// What a single tick of the loop did
#[derive(Debug)]
pub enum TickOutcome {
    Connected(Chain),
    ConnectFailed(ConnectError),
    Round(RoundReport),
    /// A round saw the node refuse connections; the loop is disconnected again
    Disconnected(RoundReport),
}

/// The polling loop: sole owner and writer of [`MonitorState`]
pub struct Monitor {
    node: Arc<dyn NodeClient>,
    supervisor: ConnectionSupervisor,
    sink: Arc<dyn MetricsSink>,
    health: Arc<HealthFlags>,
    labels: Labels,
    sync_threshold: u64,
    poll_interval: Duration,
    state: MonitorState,
    connection: Option<Connection>,
}

impl Monitor {
    pub fn new(
        config: &Config,
        node: Arc<dyn NodeClient>,
        explorer_factory: ExplorerFactory,
        sink: Arc<dyn MetricsSink>,
        health: Arc<HealthFlags>,
    ) -> Self {
        let labels = Labels::from([(gauges::NODE_LABEL.to_string(), config.node_name.clone())]);

        Self {
            supervisor: ConnectionSupervisor::new(node.clone(), explorer_factory),
            node,
            sink,
            health,
            labels,
            sync_threshold: config.sync_threshold,
            poll_interval: config.poll_interval(),
            state: MonitorState::default(),
            connection: None,
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn chain(&self) -> Option<Chain> {
        self.connection.as_ref().map(|c| c.chain)
    }

    pub fn supervisor(&self) -> &ConnectionSupervisor {
        &self.supervisor
    }

    /// Run one scheduling decision: connect when disconnected, otherwise gather
    pub async fn tick(&mut self) -> TickOutcome {
        let outcome = match self.connection.as_ref().map(|c| c.explorer.clone()) {
            None => match self.supervisor.try_connect().await {
                Ok(connection) => {
                    info!("Chain connected. Gathering metrics...");
                    let chain = connection.chain;
                    self.connection = Some(connection);
                    self.state.connected = true;
                    TickOutcome::Connected(chain)
                }
                Err(e) => {
                    warn!("Failed to connect to node: {}", e);
                    TickOutcome::ConnectFailed(e)
                }
            },
            Some(explorer) => {
                let round = GatheringRound {
                    node: self.node.as_ref(),
                    explorer: explorer.as_ref(),
                    sink: self.sink.as_ref(),
                    labels: &self.labels,
                    sync_threshold: self.sync_threshold,
                };
                let report = round.run(&mut self.state).await;

                if report.is_ok() {
                    debug!("Round completed without errors");
                    TickOutcome::Round(report)
                } else {
                    warn!("Export errors: {}", report);
                    if report.is_connection_refused() {
                        warn!("Node may be down");
                        self.disconnect();
                        TickOutcome::Disconnected(report)
                    } else {
                        TickOutcome::Round(report)
                    }
                }
            }
        };

        self.health.publish(&self.state);
        outcome
    }

    /// Drive [`Monitor::tick`] on the poll interval until `cancel` fires.
    /// Cancellation is only observed between ticks, never mid-round.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "Starting monitor, polling every {}s",
            self.poll_interval.as_secs()
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        // A round that overruns the interval drops the ticks it missed
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Monitor shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    fn disconnect(&mut self) {
        // Chain is re-resolved on reconnect in case the node was swapped
        self.connection = None;
        self.state.connected = false;
        // The last sync value stays in state but must not be scraped while down
        self.sink.remove_gauge(gauges::SYNCED, &self.labels);
    }
}
