//! Artifact persistence outcomes and re-embed flags.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageMetrics {
    pub artifacts_persisted: u64,
    /// Artifact or ranking writes that failed.
    pub persistence_failures: u64,
    pub reembed_flagged: u64,
}

impl StorageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_persisted(&mut self) {
        self.artifacts_persisted += 1;
    }

    pub fn record_persistence_failure(&mut self) {
        self.persistence_failures += 1;
    }

    pub fn record_reembed_flagged(&mut self, count: usize) {
        self.reembed_flagged += count as u64;
    }
}
