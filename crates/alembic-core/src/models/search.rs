use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Artifact, Phase};

/// Pre-similarity candidate filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Match any of these phases.
    pub phases: Vec<Phase>,
    /// Match any of these providers.
    pub providers: Vec<String>,
    /// Candidate must carry every one of these tags.
    pub tags: BTreeSet<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    /// Artifact ids never returned (e.g. the artifact being scored).
    pub exclude_ids: Vec<String>,
}

impl SearchFilter {
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phases.push(phase);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.providers.push(provider.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn excluding(mut self, id: impl Into<String>) -> Self {
        self.exclude_ids.push(id.into());
        self
    }
}

/// Tuning knobs for one search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub top_k: usize,
    pub min_similarity: f64,
    /// Lexical share of the hybrid score; ignored by pure vector search.
    pub lexical_weight: f64,
}

/// A ranked search candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub artifact: Artifact,
    /// Cosine similarity against the query vector.
    pub similarity: f64,
    /// Normalized lexical match, hybrid search only.
    pub lexical: Option<f64>,
    /// Value the hit was ranked and thresholded by.
    pub score: f64,
}

/// Hits plus artifacts skipped because their vectors no longer match the standard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub hits: Vec<SearchHit>,
    pub mismatched: Vec<String>,
}
