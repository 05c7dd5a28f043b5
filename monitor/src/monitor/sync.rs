//! Binary "is this node caught up" classification

/// Tracks whether the node's lag is within the configured threshold
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncStateTracker {
    synced: bool,
}

impl SyncStateTracker {
    pub fn new(synced: bool) -> Self {
        Self { synced }
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Classify `absolute_lag` against `threshold` (inclusive).
    /// Returns true when the classification changed.
    pub fn update(&mut self, absolute_lag: u64, threshold: u64) -> bool {
        let synced = absolute_lag <= threshold;
        let changed = synced != self.synced;
        self.synced = synced;
        changed
    }
}
