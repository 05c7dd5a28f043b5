//! Monitor state types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::sync::SyncStateTracker;
use crate::constants::chains;

/// Chains the monitor knows an explorer for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Kovan,
    Foundation,
}

impl Chain {
    /// Map a node-reported chain identifier onto the supported set
    pub fn from_node_id(id: &str) -> Option<Self> {
        match id {
            chains::KOVAN => Some(Chain::Kovan),
            chains::FOUNDATION => Some(Chain::Foundation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Kovan => chains::KOVAN,
            Chain::Foundation => chains::FOUNDATION,
        }
    }

    pub fn explorer_url(&self) -> &'static str {
        match self {
            Chain::Kovan => chains::KOVAN_EXPLORER_URL,
            Chain::Foundation => chains::FOUNDATION_EXPLORER_URL,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    pub timestamp: DateTime<Utc>,
}

impl Block {
    pub fn new(number: u64, timestamp: DateTime<Utc>) -> Self {
        Self { number, timestamp }
    }

    /// Seconds elapsed since `previous`; negative when the clock went backwards
    pub fn seconds_since(&self, previous: &Block) -> f64 {
        (self.timestamp - previous.timestamp).num_milliseconds() as f64 / 1000.0
    }
}

/// State owned by the polling loop; it is the only writer
#[derive(Debug, Default)]
pub struct MonitorState {
    pub connected: bool,
    pub sync: SyncStateTracker,
    pub last_block: Option<Block>,
}

impl MonitorState {
    pub fn synced(&self) -> bool {
        self.sync.is_synced()
    }
}

/// Connected/synced flags published for the health endpoint and other readers
#[derive(Debug, Default)]
pub struct HealthFlags {
    connected: AtomicBool,
    synced: AtomicBool,
}

impl HealthFlags {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Raw last-known sync classification, regardless of connection
    pub fn last_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// True only while connected and within the sync threshold
    pub fn is_synced(&self) -> bool {
        self.is_connected() && self.last_synced()
    }

    pub(crate) fn publish(&self, state: &MonitorState) {
        self.connected.store(state.connected, Ordering::Release);
        self.synced.store(state.synced(), Ordering::Release);
    }
}
