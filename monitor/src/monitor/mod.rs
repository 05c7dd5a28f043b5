//! Monitoring core
//!
//! This module contains the connection/sync state machine, the polling loop
//! and the gathering round that turns node and explorer queries into gauges.

mod connection;
mod polling;
mod round;
mod state;
mod sync;

pub use connection::{Connection, ConnectionSupervisor};
pub use polling::{Monitor, TickOutcome};
pub use round::{GatheringRound, RoundCause, RoundError, RoundReport, RoundStep};
pub use state::{Block, Chain, HealthFlags, MonitorState};
pub use sync::SyncStateTracker;
