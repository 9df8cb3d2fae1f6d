//! One variant: generate, measure, embed, persist, rank.
//!
//! Only generation can fail a variant. Embedding, persistence, and ranking
//! problems become warnings on an otherwise usable artifact.

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::{Duration as ChronoDuration, Utc};
use tracing::{debug, warn, Instrument};

use alembic_core::errors::AlembicResult;
use alembic_core::models::{
    Artifact, GeneratedArtifact, GenerationMetadata, GenerationRequest, Lineage, Phase,
    RankingRecord, SearchFilter, SearchOptions,
};
use alembic_core::traits::{Neighbor, RankingContext};
use alembic_observability::tracing_setup::events;
use alembic_observability::{embed_span, rank_span, variant_span};
use alembic_providers::Routed;
use alembic_tokens::estimate_usage;

use super::{Orchestrator, PhasePlan};
use crate::phases::PhaseContext;

#[derive(Debug)]
pub(crate) struct VariantOutput {
    pub generated: GeneratedArtifact,
    pub warnings: Vec<String>,
}

/// A finished generation before it is embedded and stored.
pub(crate) struct Draft {
    pub phase: Phase,
    pub lineage: Lineage,
    pub tags: BTreeSet<String>,
}

impl Orchestrator {
    pub(super) async fn run_variant(
        &self,
        plan: &PhasePlan,
        context: &PhaseContext,
        index: usize,
    ) -> AlembicResult<VariantOutput> {
        let span = variant_span!(plan.phase, index);
        self.render_and_generate(plan, context).instrument(span).await
    }

    async fn render_and_generate(
        &self,
        plan: &PhasePlan,
        context: &PhaseContext,
    ) -> AlembicResult<VariantOutput> {
        let template = self.catalog.get(&plan.phase)?;
        let request = GenerationRequest {
            prompt: template.render(context),
            system_prompt: Some(template.system_prompt.clone()),
            temperature: context.temperature,
            max_tokens: context.max_tokens,
            model: None,
        };
        let draft = Draft {
            phase: plan.phase.clone(),
            lineage: Lineage {
                request_id: plan.request_id.clone(),
                parent_id: context.parent_id.clone(),
            },
            tags: plan.tags.clone(),
        };
        let artifact = self
            .generate_artifact(plan.provider.as_deref(), &request, draft)
            .await?;
        Ok(self.settle(artifact, Some(context.original_input.as_str())).await)
    }

    /// Invoke the provider chain and wrap the completion as an artifact.
    pub(crate) async fn generate_artifact(
        &self,
        preferred: Option<&str>,
        request: &GenerationRequest,
        draft: Draft,
    ) -> AlembicResult<Artifact> {
        let started = Instant::now();
        let Routed {
            value: response,
            provider: used,
            ..
        } = self.registry.generate(preferred, request).await?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let provider = self.registry.require(&used)?;
        let usage = estimate_usage(&self.tokens, provider.descriptor(), &request.prompt, &response);
        self.metrics.record(|m| {
            m.generation
                .record_prompt(usage.input_tokens, usage.output_tokens, usage.cost)
        });

        Ok(Artifact {
            id: Artifact::new_id(),
            content_hash: Artifact::hash_content(&response.content),
            content: response.content,
            phase: draft.phase,
            provider: used,
            model: response.model,
            embedding: None,
            embedding_info: None,
            metadata: GenerationMetadata {
                temperature: request.temperature,
                max_tokens: request.max_tokens,
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
                cost: usage.cost,
                duration_ms,
            },
            tags: draft.tags,
            created_at: Utc::now(),
            lineage: draft.lineage,
        })
    }

    /// Embed, persist, and rank a freshly generated artifact.
    pub(crate) async fn settle(&self, mut artifact: Artifact, task: Option<&str>) -> VariantOutput {
        let mut warnings = Vec::new();

        let span = embed_span!(artifact.provider, self.router.dimensions());
        match self
            .router
            .compute_embedding(&artifact.content, Some(&artifact.provider))
            .instrument(span)
            .await
        {
            Ok(outcome) => {
                artifact.embedding = Some(outcome.vector);
                artifact.embedding_info = Some(outcome.info);
            }
            Err(e) => {
                // Stored unembedded; the store flags it for re-embedding.
                warn!(artifact_id = %artifact.id, error = %e, "embedding failed");
                warnings.push(format!("embedding failed: {e}"));
            }
        }

        let durable = match self.store.insert_artifact(&artifact) {
            Ok(_) => {
                self.metrics.record(|m| m.storage.record_persisted());
                true
            }
            Err(e) => {
                self.metrics.record(|m| m.storage.record_persistence_failure());
                events::persistence_failed(&artifact.id, &e.to_string());
                warnings.push(format!("artifact not durably saved: {e}"));
                false
            }
        };

        let ranking = match self.rank(&artifact, task).await {
            Ok(record) => {
                if durable {
                    if let Err(e) = self.store.save_ranking(&record) {
                        self.metrics.record(|m| m.storage.record_persistence_failure());
                        events::persistence_failed(&artifact.id, &e.to_string());
                        warnings.push(format!("ranking not saved: {e}"));
                    }
                }
                Some(record)
            }
            Err(e) => {
                warn!(artifact_id = %artifact.id, error = %e, "ranking failed");
                warnings.push(format!("ranking failed: {e}"));
                None
            }
        };

        VariantOutput {
            generated: GeneratedArtifact {
                artifact,
                ranking,
                durable,
            },
            warnings,
        }
    }

    pub(crate) async fn rank(
        &self,
        artifact: &Artifact,
        task: Option<&str>,
    ) -> AlembicResult<RankingRecord> {
        let context = self.ranking_context(artifact, task);
        self.ranker
            .score(artifact, &context)
            .instrument(rank_span!(artifact.id))
            .await
    }

    /// Recent similar artifacts and the feedback on them and on `artifact`.
    /// Lookup failures degrade to an empty context.
    pub(crate) fn ranking_context(&self, artifact: &Artifact, task: Option<&str>) -> RankingContext {
        let as_of = Utc::now();
        let mut context = RankingContext::empty(as_of);
        context.task = task.map(str::to_string);

        let vector = artifact
            .embedding
            .as_deref()
            .filter(|_| self.ranking.relevance_neighbors > 0);
        if let Some(vector) = vector {
            let filter = SearchFilter {
                created_after: Some(as_of - ChronoDuration::days(self.ranking.relevance_window_days)),
                ..SearchFilter::default()
            }
            .excluding(artifact.id.clone());
            let options = SearchOptions {
                top_k: self.ranking.relevance_neighbors,
                min_similarity: self.embedding.min_similarity,
                lexical_weight: 0.0,
            };
            match self.store.search_vector(vector, &filter, &options) {
                Ok(outcome) => {
                    context.neighbors = outcome
                        .hits
                        .into_iter()
                        .map(|hit| Neighbor {
                            artifact_id: hit.artifact.id,
                            similarity: hit.similarity,
                        })
                        .collect();
                }
                Err(e) => debug!(error = %e, "neighbor lookup failed"),
            }
        }

        let mut ids: Vec<String> = context
            .neighbors
            .iter()
            .map(|n| n.artifact_id.clone())
            .collect();
        ids.push(artifact.id.clone());
        match self.store.feedback_for_artifacts(&ids) {
            Ok(history) => context.history = history,
            Err(e) => debug!(error = %e, "feedback lookup failed"),
        }
        context
    }
}
