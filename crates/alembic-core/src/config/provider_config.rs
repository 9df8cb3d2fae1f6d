use serde::{Deserialize, Serialize};

use super::defaults;

/// Backend family a configured provider talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions + embeddings API (OpenAI, OpenRouter, vLLM, ...).
    OpenAi,
    /// Anthropic messages API. Generation only.
    Anthropic,
    /// Local Ollama server.
    Ollama,
    /// Deterministic local hashed embedder. Embeddings only, always available.
    Hashed,
}

/// One configured provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEntry {
    pub name: String,
    pub kind: ProviderKind,
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub model: String,
    pub embedding_model: Option<String>,
    pub max_context_tokens: usize,
    pub cost_per_1k_tokens: f64,
    pub relative_latency: f64,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ProviderEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: ProviderKind::Hashed,
            base_url: None,
            api_key_env: None,
            model: String::new(),
            embedding_model: None,
            max_context_tokens: defaults::DEFAULT_MAX_CONTEXT_TOKENS,
            cost_per_1k_tokens: 0.0,
            relative_latency: defaults::DEFAULT_RELATIVE_LATENCY,
            timeout_secs: defaults::DEFAULT_PROVIDER_TIMEOUT_SECS,
            max_retries: defaults::DEFAULT_PROVIDER_MAX_RETRIES,
        }
    }
}

/// Provider registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub providers: Vec<ProviderEntry>,
    /// Fallback order by provider name. Empty means registration order.
    pub fallback_order: Vec<String>,
    /// Base delay for exponential retry backoff inside a single provider.
    pub retry_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            fallback_order: Vec::new(),
            retry_backoff_ms: defaults::DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}
