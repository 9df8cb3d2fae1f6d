//! Central metrics registry.
//!
//! [`MetricsCollector`] owns the per-domain collectors. Subsystems record
//! through a [`SharedMetrics`] handle, and callers read a snapshot.

pub mod generation_metrics;
pub mod learning_metrics;
pub mod provider_metrics;
pub mod storage_metrics;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

pub use generation_metrics::GenerationMetrics;
pub use learning_metrics::LearningMetrics;
pub use provider_metrics::ProviderMetrics;
pub use storage_metrics::StorageMetrics;

/// Every domain collector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsCollector {
    pub generation: GenerationMetrics,
    pub provider: ProviderMetrics,
    pub storage: StorageMetrics,
    pub learning: LearningMetrics,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all metrics (useful for testing or periodic rotation).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Cloneable handle over one collector. Clones record into the same counters.
#[derive(Debug, Clone, Default)]
pub struct SharedMetrics {
    inner: Arc<Mutex<MetricsCollector>>,
}

impl SharedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` under the lock. A poisoned lock still records.
    pub fn record(&self, f: impl FnOnce(&mut MetricsCollector)) {
        match self.inner.lock() {
            Ok(mut metrics) => f(&mut metrics),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    pub fn snapshot(&self) -> MetricsCollector {
        match self.inner.lock() {
            Ok(metrics) => metrics.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn reset(&self) {
        self.record(MetricsCollector::reset);
    }
}
