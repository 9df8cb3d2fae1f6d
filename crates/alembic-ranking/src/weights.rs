//! Atomic publication of the active weight vector.
//!
//! Readers take an `Arc` snapshot and score against it for the whole call;
//! the learner swaps in a complete new vector. No field is ever written in
//! place, so a reader sees either the old version or the new one.

use std::sync::{Arc, RwLock};

use tracing::info;

use alembic_core::config::RankingConfig;
use alembic_core::errors::LearningError;
use alembic_core::models::{Factor, WeightVector};

pub struct WeightStore {
    current: RwLock<Arc<WeightVector>>,
}

impl WeightStore {
    pub fn new(initial: WeightVector) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Version 1 built from the configured default weights.
    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(WeightVector::initial(
            config.weight_temperature,
            config.weight_token_efficiency,
            config.weight_relevance,
            config.weight_historical,
        ))
    }

    /// The active vector. Holding the returned `Arc` pins that version.
    pub fn snapshot(&self) -> Arc<WeightVector> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            // A panicking writer never leaves a torn value: the swap is one store.
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    /// Replace the active vector. `next` must carry a higher version and
    /// finite weights; otherwise the current vector stays active.
    pub fn publish(&self, next: WeightVector) -> Result<Arc<WeightVector>, LearningError> {
        for factor in Factor::ALL {
            if !next.get(factor).is_finite() {
                return Err(LearningError::NonFiniteWeight {
                    factor: factor.to_string(),
                });
            }
        }
        let mut guard = self
            .current
            .write()
            .map_err(|e| LearningError::WeightStoreUnavailable {
                reason: format!("weight lock poisoned: {e}"),
            })?;
        if next.version <= guard.version {
            return Err(LearningError::WeightStoreUnavailable {
                reason: format!(
                    "version {} is not newer than active version {}",
                    next.version, guard.version
                ),
            });
        }
        let published = Arc::new(next);
        *guard = Arc::clone(&published);
        info!(version = published.version, "weights published");
        Ok(published)
    }
}
