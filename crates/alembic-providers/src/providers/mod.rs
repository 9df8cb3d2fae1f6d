//! Concrete provider implementations and the config-driven factory.

mod anthropic;
mod hashed;
mod ollama;
mod openai;

pub use anthropic::AnthropicProvider;
pub use hashed::HashedEmbedder;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;
use std::time::Duration;

use alembic_core::config::{EmbeddingConfig, ProviderEntry, ProviderKind};
use alembic_core::models::ProviderDescriptor;
use alembic_core::traits::IProvider;
use tracing::warn;

/// Build a provider from its config entry.
///
/// API keys are read from the environment variable named by `api_key_env`.
/// A missing key does not fail construction: the provider reports itself
/// unavailable and every call fails fast, so the chain moves on.
pub fn create_provider(
    entry: &ProviderEntry,
    embedding: &EmbeddingConfig,
    retry_backoff: Duration,
) -> Arc<dyn IProvider> {
    let timeout = Duration::from_secs(entry.timeout_secs);
    let api_key = entry.api_key_env.as_deref().and_then(|var| {
        let key = std::env::var(var).ok().filter(|k| !k.is_empty());
        if key.is_none() {
            warn!(provider = %entry.name, env = var, "API key variable not set");
        }
        key
    });

    match entry.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
            descriptor_for(entry),
            entry.base_url.clone(),
            api_key,
            timeout,
            entry.max_retries,
            retry_backoff,
        )),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
            descriptor_for(entry),
            entry.base_url.clone(),
            api_key,
            timeout,
            entry.max_retries,
            retry_backoff,
        )),
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(
            descriptor_for(entry),
            entry.base_url.clone(),
            timeout,
            entry.max_retries,
            retry_backoff,
        )),
        ProviderKind::Hashed => {
            let model = if entry.model.is_empty() {
                embedding.model_name.clone()
            } else {
                entry.model.clone()
            };
            Arc::new(HashedEmbedder::new(
                entry.name.clone(),
                model,
                embedding.dimensions,
            ))
        }
    }
}

fn descriptor_for(entry: &ProviderEntry) -> ProviderDescriptor {
    ProviderDescriptor {
        name: entry.name.clone(),
        supports_generation: true,
        supports_embeddings: entry.embedding_model.is_some(),
        max_context_tokens: entry.max_context_tokens,
        cost_per_1k_tokens: entry.cost_per_1k_tokens,
        relative_latency: entry.relative_latency,
        model: entry.model.clone(),
        embedding_model: entry.embedding_model.clone(),
    }
}
