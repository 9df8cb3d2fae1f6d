//! Embedding router: one embedding standard, many providers.
//!
//! Every stored vector must match the standard's dimensionality. The router
//! asks the requested provider first and falls back through the registry;
//! when a different provider answers, the substitution is recorded with the
//! vector so it can be audited later.

use std::sync::Arc;
use std::time::Duration;

use alembic_core::config::EmbeddingConfig;
use alembic_core::errors::AlembicResult;
use alembic_core::models::{Capability, EmbeddingInfo, EmbeddingOutcome};
use moka::sync::Cache;
use tracing::{debug, warn};

use crate::chain::Routed;
use crate::registry::ProviderRegistry;

pub struct EmbeddingRouter {
    registry: Arc<ProviderRegistry>,
    dimensions: usize,
    model_name: String,
    preferred: Option<String>,
    cache: Cache<String, EmbeddingOutcome>,
}

impl EmbeddingRouter {
    pub fn new(registry: Arc<ProviderRegistry>, config: &EmbeddingConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();
        Self {
            registry,
            dimensions: config.dimensions,
            model_name: config.model_name.clone(),
            preferred: config.preferred_provider.clone(),
            cache,
        }
    }

    /// Declared dimensionality of the standard.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Provider the router asks first. The configured preference wins over
    /// the generating provider; with neither, the first capable provider.
    pub fn requested_provider(&self, generating_provider: Option<&str>) -> Option<String> {
        self.preferred
            .clone()
            .or_else(|| generating_provider.map(str::to_string))
            .or_else(|| {
                self.registry
                    .resolve_order(Capability::Embedding, None)
                    .first()
                    .map(|p| p.name().to_string())
            })
    }

    /// Embed `text` under the standard.
    pub async fn compute_embedding(
        &self,
        text: &str,
        generating_provider: Option<&str>,
    ) -> AlembicResult<EmbeddingOutcome> {
        let requested = self.requested_provider(generating_provider).unwrap_or_default();
        let key = cache_key(&requested, text);
        if let Some(hit) = self.cache.get(&key) {
            debug!(requested = %requested, "embedding cache hit");
            return Ok(hit);
        }

        let preferred = (!requested.is_empty()).then_some(requested.as_str());
        let Routed {
            value: vector,
            provider: used,
            ..
        } = self.registry.embed(preferred, text, self.dimensions).await?;

        let substituted = used != requested;
        if substituted {
            warn!(
                requested = %requested,
                used = %used,
                "embedding provider substituted"
            );
        }
        let model = self
            .registry
            .get(&used)
            .and_then(|p| p.descriptor().embedding_model.clone())
            .unwrap_or_else(|| self.model_name.clone());

        let outcome = EmbeddingOutcome {
            vector,
            info: EmbeddingInfo {
                provider: used,
                model,
                dimensions: self.dimensions,
                requested_provider: requested,
                substituted,
            },
        };
        self.cache.insert(key, outcome.clone());
        Ok(outcome)
    }

    /// Embed a search query with no generating provider.
    pub async fn embed_query(&self, text: &str) -> AlembicResult<Vec<f32>> {
        Ok(self.compute_embedding(text, None).await?.vector)
    }
}

fn cache_key(requested: &str, text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(requested.as_bytes());
    hasher.update(b"\0");
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}
