//! Hashed term-frequency embedder.
//!
//! Generates fixed-dimension vectors by hashing terms into buckets weighted by
//! term frequency. No network, no model files: always available, which makes
//! it the last link of every embedding chain.

use std::collections::HashMap;

use alembic_core::errors::ProviderError;
use alembic_core::models::{GenerationRequest, GenerationResponse, ProviderDescriptor};
use alembic_core::traits::IProvider;
use async_trait::async_trait;

/// Deterministic local embedding provider.
pub struct HashedEmbedder {
    descriptor: ProviderDescriptor,
    dimensions: usize,
}

impl HashedEmbedder {
    pub fn new(name: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        let model = model.into();
        Self {
            descriptor: ProviderDescriptor {
                name: name.into(),
                supports_generation: false,
                supports_embeddings: true,
                max_context_tokens: usize::MAX,
                cost_per_1k_tokens: 0.0,
                relative_latency: 0.01,
                model: model.clone(),
                embedding_model: Some(model),
            },
            dimensions,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Hash a term into a bucket index using FNV-1a.
    fn hash_term(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % dims as u64) as usize
    }

    /// Lowercase alphanumeric terms of at least two characters.
    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.chars().count() >= 2)
            .map(|s| s.to_lowercase())
            .collect()
    }

    /// Build an L2-normalized term-frequency vector.
    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vec;
        }
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        // Sorted so float accumulation order is stable across runs.
        let mut terms: Vec<(&str, f32)> = tf.into_iter().collect();
        terms.sort_by(|a, b| a.0.cmp(b.0));
        for (term, count) in terms {
            let freq = count / total;
            // Longer terms carry more signal than short, stopword-like ones.
            let idf = 1.0 + (term.chars().count() as f32).ln();
            vec[Self::hash_term(term, self.dimensions)] += freq * idf;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl IProvider for HashedEmbedder {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        Err(ProviderError::Unsupported {
            provider: self.descriptor.name.clone(),
            capability: "generation".to_string(),
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(self.vectorize(text))
    }

    async fn is_available(&self) -> bool {
        true
    }
}
