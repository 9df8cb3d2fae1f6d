use std::collections::BTreeSet;

use alembic_core::models::{Artifact, EmbeddingInfo, GenerationMetadata, Lineage, Phase};
use chrono::{DateTime, Duration, Utc};

/// Fluent builder for stored artifacts.
pub struct ArtifactBuilder {
    artifact: Artifact,
}

/// Start an artifact with the given id and content in the `prima-materia` phase.
pub fn artifact(id: &str, content: &str) -> ArtifactBuilder {
    ArtifactBuilder {
        artifact: Artifact {
            id: id.to_string(),
            content: content.to_string(),
            phase: Phase::prima_materia(),
            provider: "scripted".to_string(),
            model: "scripted-model".to_string(),
            embedding: None,
            embedding_info: None,
            metadata: GenerationMetadata {
                temperature: 0.7,
                max_tokens: 512,
                input_tokens: 20,
                output_tokens: 100,
                cost: 0.0,
                duration_ms: 10,
            },
            tags: BTreeSet::new(),
            created_at: Utc::now(),
            lineage: Lineage {
                request_id: "req-fixture".to_string(),
                parent_id: None,
            },
            content_hash: Artifact::hash_content(content),
        },
    }
}

impl ArtifactBuilder {
    pub fn phase(mut self, phase: &str) -> Self {
        self.artifact.phase = Phase::new(phase);
        self
    }

    pub fn provider(mut self, provider: &str) -> Self {
        self.artifact.provider = provider.to_string();
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.artifact.tags.insert(tag.to_string());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.artifact.metadata.temperature = temperature;
        self
    }

    pub fn tokens(mut self, input: u32, output: u32) -> Self {
        self.artifact.metadata.input_tokens = input;
        self.artifact.metadata.output_tokens = output;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.artifact.created_at = at;
        self
    }

    pub fn days_old(mut self, days: i64) -> Self {
        self.artifact.created_at = Utc::now() - Duration::days(days);
        self
    }

    pub fn parent(mut self, parent_id: &str) -> Self {
        self.artifact.lineage.parent_id = Some(parent_id.to_string());
        self
    }

    /// Attach a vector recorded as produced by `provider`, unsubstituted.
    pub fn embedding(mut self, vector: Vec<f32>) -> Self {
        self.artifact.embedding_info = Some(EmbeddingInfo {
            provider: self.artifact.provider.clone(),
            model: "scripted-embed".to_string(),
            dimensions: vector.len(),
            requested_provider: self.artifact.provider.clone(),
            substituted: false,
        });
        self.artifact.embedding = Some(vector);
        self
    }

    pub fn build(self) -> Artifact {
        self.artifact
    }
}

/// Unit vector along `axis`, optionally tilted toward `axis + 1` by `tilt`.
pub fn unit_vector(dims: usize, axis: usize, tilt: f32) -> Vec<f32> {
    let mut v = vec![0.0f32; dims];
    if dims == 0 {
        return v;
    }
    v[axis % dims] = 1.0;
    if tilt != 0.0 {
        v[(axis + 1) % dims] += tilt;
    }
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    v.iter_mut().for_each(|x| *x /= norm);
    v
}
