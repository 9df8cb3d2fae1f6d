//! Capability-aware provider registry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use alembic_core::config::{EmbeddingConfig, ProviderConfig, ProviderKind};
use alembic_core::errors::{AlembicError, AlembicResult, ProviderError};
use alembic_core::models::{
    Capability, GenerationRequest, GenerationResponse, ProviderDescriptor, ProviderStatus,
};
use alembic_core::traits::IProvider;
use tracing::{debug, info};

use alembic_observability::SharedMetrics;

use crate::chain::{FallbackChain, Routed};
use crate::providers::{self, HashedEmbedder};

/// Name given to the implicit last-resort embedder.
pub const LOCAL_EMBEDDER: &str = "local-hashed";

/// Registered providers plus the order in which they back each other up.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn IProvider>>,
    fallback_order: Vec<String>,
    chain: FallbackChain,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            fallback_order: Vec::new(),
            chain: FallbackChain::new(),
        }
    }

    /// Build every configured provider.
    ///
    /// A hashed embedder is appended when none is configured, so embedding
    /// always has a provider that cannot fail.
    pub fn from_config(
        config: &ProviderConfig,
        embedding: &EmbeddingConfig,
    ) -> AlembicResult<Self> {
        let backoff = Duration::from_millis(config.retry_backoff_ms);
        let mut registry = Self::new();
        for entry in &config.providers {
            registry.register(providers::create_provider(entry, embedding, backoff))?;
        }
        let has_local = config
            .providers
            .iter()
            .any(|e| e.kind == ProviderKind::Hashed);
        if !has_local && registry.get(LOCAL_EMBEDDER).is_none() {
            registry.register(Arc::new(HashedEmbedder::new(
                LOCAL_EMBEDDER,
                embedding.model_name.clone(),
                embedding.dimensions,
            )))?;
        }
        registry.set_fallback_order(config.fallback_order.clone())?;

        info!(
            providers = registry.providers.len(),
            fallback_order = ?registry.fallback_order,
            "provider registry initialized"
        );
        Ok(registry)
    }

    /// Add a provider. Names are unique.
    pub fn register(&mut self, provider: Arc<dyn IProvider>) -> AlembicResult<()> {
        if self.get(provider.name()).is_some() {
            return Err(AlembicError::Config {
                reason: format!("provider '{}' registered twice", provider.name()),
            });
        }
        debug!(provider = provider.name(), "registered provider");
        self.providers.push(provider);
        Ok(())
    }

    /// Record provider attempts into `metrics`.
    pub fn set_metrics(&mut self, metrics: SharedMetrics) {
        self.chain = FallbackChain::with_metrics(metrics);
    }

    /// Set the preferred fallback order. Every name must be registered.
    pub fn set_fallback_order(&mut self, order: Vec<String>) -> AlembicResult<()> {
        if let Some(unknown) = order.iter().find(|n| self.get(n).is_none()) {
            return Err(AlembicError::Config {
                reason: format!("fallback order names unknown provider '{unknown}'"),
            });
        }
        self.fallback_order = order;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn IProvider>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }

    /// Like [`get`](Self::get) but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<Arc<dyn IProvider>, ProviderError> {
        self.get(name).ok_or_else(|| ProviderError::NotRegistered {
            name: name.to_string(),
        })
    }

    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.providers.iter().map(|p| p.descriptor().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Every registered provider with a live availability probe.
    pub async fn list_providers(&self) -> Vec<ProviderStatus> {
        let mut statuses = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            statuses.push(ProviderStatus {
                descriptor: provider.descriptor().clone(),
                available: provider.is_available().await,
            });
        }
        statuses
    }

    /// Static chain for a capability: the preferred provider when capable,
    /// then the fallback order, then everything else in registration order.
    pub fn resolve_order(
        &self,
        capability: Capability,
        preferred: Option<&str>,
    ) -> Vec<Arc<dyn IProvider>> {
        let mut seen = HashSet::new();
        let names = preferred
            .into_iter()
            .chain(self.fallback_order.iter().map(String::as_str))
            .chain(self.providers.iter().map(|p| p.name()));

        let mut chain = Vec::new();
        for name in names {
            if !seen.insert(name.to_string()) {
                continue;
            }
            if let Some(provider) = self.get(name) {
                if provider.descriptor().supports(capability) {
                    chain.push(provider);
                }
            }
        }
        chain
    }

    /// [`resolve_order`](Self::resolve_order) with healthy providers moved
    /// ahead of unhealthy ones. Unhealthy providers stay in the chain.
    pub async fn resolve(
        &self,
        capability: Capability,
        preferred: Option<&str>,
    ) -> Vec<Arc<dyn IProvider>> {
        let order = self.resolve_order(capability, preferred);
        let mut healthy = Vec::with_capacity(order.len());
        let mut unhealthy = Vec::new();
        for provider in order {
            if provider.is_available().await {
                healthy.push(provider);
            } else {
                debug!(provider = provider.name(), "provider unhealthy, demoted");
                unhealthy.push(provider);
            }
        }
        healthy.extend(unhealthy);
        healthy
    }

    /// Generate through the resolved chain.
    pub async fn generate(
        &self,
        preferred: Option<&str>,
        request: &GenerationRequest,
    ) -> AlembicResult<Routed<GenerationResponse>> {
        let chain = self.resolve(Capability::Generation, preferred).await;
        self.chain.generate(&chain, request).await
    }

    /// Embed through the resolved chain, requiring exactly `dimensions` values.
    pub async fn embed(
        &self,
        preferred: Option<&str>,
        text: &str,
        dimensions: usize,
    ) -> AlembicResult<Routed<Vec<f32>>> {
        let chain = self.resolve(Capability::Embedding, preferred).await;
        self.chain.embed(&chain, text, dimensions).await
    }
}
