pub mod defaults;
pub mod embedding_config;
pub mod learning_config;
pub mod pipeline_config;
pub mod provider_config;
pub mod ranking_config;
pub mod storage_config;

pub use embedding_config::EmbeddingConfig;
pub use learning_config::LearningConfig;
pub use pipeline_config::{PhaseTemplateConfig, PipelineConfig};
pub use provider_config::{ProviderConfig, ProviderEntry, ProviderKind};
pub use ranking_config::{RankerKind, RankingConfig};
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{AlembicError, AlembicResult};

/// Top-level configuration aggregating every subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlembicConfig {
    pub providers: ProviderConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub ranking: RankingConfig,
    pub learning: LearningConfig,
}

impl AlembicConfig {
    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(input: &str) -> AlembicResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| AlembicError::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no subsystem can run with.
    pub fn validate(&self) -> AlembicResult<()> {
        if self.pipeline.worker_pool_size == 0 {
            return Err(config_err("pipeline.worker_pool_size must be at least 1"));
        }
        if self.pipeline.history_enhancement && self.pipeline.history_candidates == 0 {
            return Err(config_err("pipeline.history_candidates must be at least 1"));
        }
        if self.embedding.dimensions == 0 {
            return Err(config_err("embedding.dimensions must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.embedding.lexical_weight) {
            return Err(config_err("embedding.lexical_weight must be within 0..1"));
        }
        if !(-1.0..=1.0).contains(&self.embedding.min_similarity) {
            return Err(config_err("embedding.min_similarity must be within -1..1"));
        }
        if self.ranking.decay_half_life_days <= 0.0 {
            return Err(config_err("ranking.decay_half_life_days must be positive"));
        }
        if self.learning.max_step < 0.0 || self.learning.min_weight > self.learning.max_weight {
            return Err(config_err("learning step/weight bounds are inconsistent"));
        }
        let mut seen = std::collections::HashSet::new();
        for entry in &self.providers.providers {
            if entry.name.is_empty() {
                return Err(config_err("every provider needs a name"));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(config_err(&format!("duplicate provider name '{}'", entry.name)));
            }
        }
        Ok(())
    }
}

fn config_err(reason: &str) -> AlembicError {
    AlembicError::Config {
        reason: reason.to_string(),
    }
}
