use serde::{Deserialize, Serialize};

/// What a provider is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Overrides the provider's configured model.
    pub model: Option<String>,
}

/// What a provider returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub content: String,
    pub model: String,
    /// Token usage reported by the backend, when it reports any.
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

/// A vector plus the provenance the store records next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutcome {
    pub vector: Vec<f32>,
    pub info: super::EmbeddingInfo,
}
