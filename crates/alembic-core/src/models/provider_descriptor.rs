use serde::{Deserialize, Serialize};

/// A capability a caller can ask the registry to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Generation,
    Embedding,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generation => f.write_str("generation"),
            Self::Embedding => f.write_str("embedding"),
        }
    }
}

/// Capability record for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub supports_generation: bool,
    pub supports_embeddings: bool,
    pub max_context_tokens: usize,
    /// Estimated USD per 1k tokens.
    pub cost_per_1k_tokens: f64,
    /// Latency relative to a baseline of 1.0.
    pub relative_latency: f64,
    pub model: String,
    pub embedding_model: Option<String>,
}

impl ProviderDescriptor {
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Generation => self.supports_generation,
            Capability::Embedding => self.supports_embeddings,
        }
    }

    /// Estimated cost of spending `tokens` on this provider.
    pub fn estimate_cost(&self, tokens: u32) -> f64 {
        f64::from(tokens) / 1000.0 * self.cost_per_1k_tokens
    }
}

/// A descriptor plus the result of a live availability probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub descriptor: ProviderDescriptor,
    pub available: bool,
}
