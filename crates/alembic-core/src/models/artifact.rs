use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Phase;

/// Token, cost, and timing data captured when the artifact was generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub temperature: f64,
    pub max_tokens: u32,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost: f64,
    pub duration_ms: u64,
}

impl GenerationMetadata {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Where an artifact's embedding came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingInfo {
    /// Provider that actually produced the vector.
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    /// Provider the caller asked for.
    pub requested_provider: String,
    /// True when the requested provider could not embed and a fallback did.
    pub substituted: bool,
}

/// Parentage of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    /// Generate request that produced the artifact.
    pub request_id: String,
    /// Artifact this one was derived from (cascade input or optimization base).
    pub parent_id: Option<String>,
}

/// The unit of work product. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub content: String,
    pub phase: Phase,
    pub provider: String,
    pub model: String,
    pub embedding: Option<Vec<f32>>,
    pub embedding_info: Option<EmbeddingInfo>,
    pub metadata: GenerationMetadata,
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub lineage: Lineage,
    /// blake3 hex of `content`.
    pub content_hash: String,
}

impl Artifact {
    /// Fresh opaque identifier (UUID v4).
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn hash_content(content: &str) -> String {
        blake3::hash(content.as_bytes()).to_hex().to_string()
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}
