use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding standard and vector search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Declared dimensionality of the embedding standard.
    pub dimensions: usize,
    /// Model name recorded with every stored vector.
    pub model_name: String,
    /// Provider preferred for embeddings. `None` defers to the generating provider.
    pub preferred_provider: Option<String>,
    pub cache_capacity: u64,
    pub cache_ttl_secs: u64,
    pub reembed_batch_size: usize,
    pub reembed_interval_secs: u64,
    /// Candidates below this cosine similarity are dropped.
    pub min_similarity: f64,
    /// Share of the hybrid score taken by the lexical match, 0..1.
    pub lexical_weight: f64,
    pub default_top_k: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            model_name: defaults::DEFAULT_EMBEDDING_MODEL.to_string(),
            preferred_provider: None,
            cache_capacity: defaults::DEFAULT_EMBEDDING_CACHE_SIZE,
            cache_ttl_secs: defaults::DEFAULT_EMBEDDING_CACHE_TTL_SECS,
            reembed_batch_size: defaults::DEFAULT_REEMBED_BATCH_SIZE,
            reembed_interval_secs: defaults::DEFAULT_REEMBED_INTERVAL_SECS,
            min_similarity: defaults::DEFAULT_MIN_SIMILARITY,
            lexical_weight: defaults::DEFAULT_LEXICAL_WEIGHT,
            default_top_k: defaults::DEFAULT_TOP_K,
        }
    }
}
