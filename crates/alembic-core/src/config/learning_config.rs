use serde::{Deserialize, Serialize};

use super::defaults;

/// Learning engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub enabled: bool,
    /// Multiplier applied to each factor's outcome correlation.
    pub learning_rate: f64,
    /// Largest change any single weight may take in one run.
    pub max_step: f64,
    pub min_batch_size: usize,
    pub max_batch_size: usize,
    pub min_weight: f64,
    pub max_weight: f64,
    pub training_interval_secs: u64,
    /// Normalized outcome at or above which feedback counts as positive.
    pub positive_threshold: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            max_step: defaults::DEFAULT_MAX_STEP,
            min_batch_size: defaults::DEFAULT_MIN_BATCH_SIZE,
            max_batch_size: defaults::DEFAULT_MAX_BATCH_SIZE,
            min_weight: defaults::DEFAULT_MIN_WEIGHT,
            max_weight: defaults::DEFAULT_MAX_WEIGHT,
            training_interval_secs: defaults::DEFAULT_TRAINING_INTERVAL_SECS,
            positive_threshold: defaults::DEFAULT_POSITIVE_THRESHOLD,
        }
    }
}
