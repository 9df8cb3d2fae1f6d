//! Request orchestration: the per-request state machine, optional history
//! hints, phase execution through the worker pool, fingerprint dedup, and
//! strategy selection.

mod dedup;
mod history;
mod pool;
mod variant;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use tracing::{info, Instrument};

use alembic_core::config::{EmbeddingConfig, PipelineConfig, RankingConfig};
use alembic_core::errors::{AlembicError, AlembicResult};
use alembic_core::models::{
    Artifact, GenerateRequest, GenerateResult, GeneratedArtifact, PartialFailure, Phase,
    RequestState, SelectionStrategy,
};
use alembic_core::traits::{IArtifactStore, IRanker};
use alembic_observability::tracing_setup::events;
use alembic_observability::{generate_span, phase_span, SharedMetrics};
use alembic_providers::{EmbeddingRouter, ProviderRegistry};
use alembic_ranking::compare_ranked;
use alembic_tokens::TokenCounter;

use crate::phases::{PhaseCatalog, PhaseContext};

pub use dedup::fingerprint;
use dedup::InflightPhases;
use pool::WorkerPool;
pub(crate) use variant::{Draft, VariantOutput};

/// What one phase execution runs, minus the text it runs on.
#[derive(Debug, Clone, PartialEq)]
pub struct PhasePlan {
    pub request_id: String,
    pub phase: Phase,
    /// Preferred provider after request pin and per-phase config.
    pub provider: Option<String>,
    pub variants: usize,
    pub strategy: SelectionStrategy,
    pub tags: BTreeSet<String>,
}

/// Successful variants of one phase plus what went wrong on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseOutcome {
    /// In variant order.
    pub artifacts: Vec<GeneratedArtifact>,
    pub failures: Vec<PartialFailure>,
}

impl PhaseOutcome {
    /// Best ranked artifact. Unranked artifacts lose to ranked ones.
    pub fn winner(&self) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().min_by(|a, b| compare_generated(a, b))
    }
}

fn compare_generated(a: &GeneratedArtifact, b: &GeneratedArtifact) -> Ordering {
    match (&a.ranking, &b.ranking) {
        (Some(ra), Some(rb)) => compare_ranked((&a.artifact, ra), (&b.artifact, rb)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .artifact
            .created_at
            .cmp(&b.artifact.created_at)
            .then_with(|| a.artifact.id.cmp(&b.artifact.id)),
    }
}

pub(crate) struct Orchestrator {
    pub(crate) registry: Arc<ProviderRegistry>,
    pub(crate) router: Arc<EmbeddingRouter>,
    pub(crate) store: Arc<dyn IArtifactStore>,
    pub(crate) ranker: Arc<dyn IRanker>,
    pub(crate) tokens: TokenCounter,
    pub(crate) catalog: PhaseCatalog,
    pub(crate) pipeline: PipelineConfig,
    pub(crate) ranking: RankingConfig,
    pub(crate) embedding: EmbeddingConfig,
    pub(crate) metrics: SharedMetrics,
    pool: WorkerPool,
    inflight: InflightPhases,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        registry: Arc<ProviderRegistry>,
        router: Arc<EmbeddingRouter>,
        store: Arc<dyn IArtifactStore>,
        ranker: Arc<dyn IRanker>,
        catalog: PhaseCatalog,
        pipeline: PipelineConfig,
        ranking: RankingConfig,
        embedding: EmbeddingConfig,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            pool: WorkerPool::new(pipeline.worker_pool_size),
            tokens: TokenCounter::default(),
            inflight: InflightPhases::default(),
            registry,
            router,
            store,
            ranker,
            catalog,
            pipeline,
            ranking,
            embedding,
            metrics,
        }
    }

    pub(crate) fn in_flight_phases(&self) -> usize {
        self.inflight.in_flight()
    }

    pub(crate) async fn generate(
        self: &Arc<Self>,
        request: GenerateRequest,
    ) -> AlembicResult<GenerateResult> {
        request.validate(self.pipeline.max_variant_count)?;
        self.catalog.check_all(&request.phases)?;

        let request_id = Artifact::new_id();
        let span = generate_span!(request_id, request.strategy.as_str());
        let result = self.run_request(request_id, request).instrument(span).await;
        self.metrics
            .record(|m| m.generation.record_request(result.is_ok()));
        result
    }

    async fn run_request(
        self: &Arc<Self>,
        request_id: String,
        request: GenerateRequest,
    ) -> AlembicResult<GenerateResult> {
        let budget_ms = request.timeout_ms.unwrap_or(self.pipeline.request_timeout_ms);
        let deadline = Instant::now() + Duration::from_millis(budget_ms);
        let variants = usize::try_from(request.variant_count).unwrap_or(1).max(1);
        let cascade = request.strategy == SelectionStrategy::Cascade;
        info!(
            phases = request.phases.len(),
            variants,
            strategy = request.strategy.as_str(),
            "generate started"
        );

        let mut states = vec![RequestState::Pending];
        let mut artifacts = Vec::new();
        let mut warnings = Vec::new();
        let mut phase_errors = Vec::new();
        let mut context = PhaseContext::from_request(&request, &self.pipeline);
        if self.pipeline.history_enhancement {
            self.enhance_with_history(&mut context).await;
        }

        for (index, phase) in request.phases.iter().enumerate() {
            if index > 0 && !cascade {
                context = context.propagate_to_next();
            }
            states.push(RequestState::PhaseRunning {
                index,
                phase: phase.clone(),
            });

            let plan = PhasePlan {
                request_id: request_id.clone(),
                phase: phase.clone(),
                provider: request
                    .provider
                    .clone()
                    .or_else(|| self.pipeline.phase_providers.get(phase.as_str()).cloned()),
                // After the first cascade phase the winner is the only input.
                variants: if cascade && index > 0 { 1 } else { variants },
                strategy: request.strategy,
                tags: request.tags.clone(),
            };

            match self.run_phase_shared(plan, &context, deadline, budget_ms).await {
                Ok(outcome) => {
                    states.push(RequestState::PhaseComplete {
                        index,
                        phase: phase.clone(),
                    });
                    warnings.extend(outcome.failures.iter().cloned());
                    match request.strategy {
                        SelectionStrategy::All => artifacts.extend(outcome.artifacts),
                        SelectionStrategy::BestPerPhase => {
                            artifacts.extend(outcome.winner().cloned());
                        }
                        SelectionStrategy::Cascade => {
                            if let Some(winner) = outcome.winner() {
                                context = context.chained_from(&winner.artifact);
                                artifacts.push(winner.clone());
                            }
                        }
                    }
                }
                Err(e) if cascade => {
                    // Nothing to feed the next phase.
                    states.push(RequestState::Failed {
                        reason: e.to_string(),
                    });
                    info!(phase = %phase, error = %e, states = states.len(), "cascade failed");
                    return Err(e);
                }
                Err(e) => {
                    let reason = e.to_string();
                    events::partial_failure(&request_id, phase.as_str(), None, &reason);
                    phase_errors.push(format!("{phase}: {reason}"));
                    warnings.push(PartialFailure {
                        phase: phase.clone(),
                        variant: None,
                        reason,
                    });
                }
            }
        }

        if artifacts.is_empty() {
            return Err(AlembicError::GenerationFailed {
                reasons: phase_errors,
            });
        }

        states.push(RequestState::Finalizing);
        states.push(RequestState::Done);
        info!(
            artifacts = artifacts.len(),
            warnings = warnings.len(),
            "generate finished"
        );
        Ok(GenerateResult {
            request_id,
            artifacts,
            warnings,
            states,
        })
    }

    /// Run a phase, or wait for an identical one already in flight.
    async fn run_phase_shared(
        self: &Arc<Self>,
        plan: PhasePlan,
        context: &PhaseContext,
        deadline: Instant,
        budget_ms: u64,
    ) -> AlembicResult<PhaseOutcome> {
        let key = fingerprint(&plan, context);
        let scope = format!("phase {}", plan.phase);
        let this = Arc::clone(self);
        let context = context.clone();
        let shared = self
            .inflight
            .run(key, move || this.run_phase(plan, context, deadline));
        match timeout_at(deadline, shared).await {
            Ok(result) => result,
            Err(_) => Err(AlembicError::DeadlineExceeded {
                scope,
                after_ms: budget_ms,
            }),
        }
    }

    async fn run_phase(
        self: Arc<Self>,
        plan: PhasePlan,
        context: PhaseContext,
        request_deadline: Instant,
    ) -> AlembicResult<PhaseOutcome> {
        let phase_budget = Duration::from_millis(self.pipeline.phase_timeout_ms);
        let deadline = request_deadline.min(Instant::now() + phase_budget);
        let span = phase_span!(plan.phase, plan.variants);
        let started = Instant::now();
        let plan = Arc::new(plan);
        let context = Arc::new(context);

        let batch = self
            .pool
            .run_until(plan.variants, deadline, |index| {
                let this = Arc::clone(&self);
                let plan = Arc::clone(&plan);
                let context = Arc::clone(&context);
                async move { this.run_variant(&plan, &context, index).await }
            })
            .instrument(span)
            .await;

        let mut completed = batch.completed;
        completed.sort_by_key(|(index, _)| *index);

        let mut artifacts = Vec::with_capacity(completed.len());
        let mut failures = Vec::new();
        let mut failed = 0;
        let mut first_error = None;
        for (index, result) in completed {
            match result {
                Ok(output) => {
                    failures.extend(output.warnings.into_iter().map(|reason| PartialFailure {
                        phase: plan.phase.clone(),
                        variant: Some(index),
                        reason,
                    }));
                    artifacts.push(output.generated);
                }
                Err(e) => {
                    failed += 1;
                    failures.push(PartialFailure {
                        phase: plan.phase.clone(),
                        variant: Some(index),
                        reason: e.to_string(),
                    });
                    first_error.get_or_insert(e);
                }
            }
        }
        let lost_reason = if batch.deadline_hit {
            "deadline exceeded before the variant finished"
        } else {
            "variant task aborted"
        };
        for index in batch.lost {
            failed += 1;
            failures.push(PartialFailure {
                phase: plan.phase.clone(),
                variant: Some(index),
                reason: lost_reason.to_string(),
            });
        }

        for failure in &failures {
            events::partial_failure(
                &plan.request_id,
                plan.phase.as_str(),
                failure.variant,
                &failure.reason,
            );
        }
        events::phase_completed(&plan.request_id, plan.phase.as_str(), artifacts.len(), failed);
        self.metrics
            .record(|m| m.generation.record_phase(plan.phase.as_str(), started.elapsed()));

        if artifacts.is_empty() {
            return Err(first_error.unwrap_or_else(|| AlembicError::DeadlineExceeded {
                scope: format!("phase {}", plan.phase),
                after_ms: u64::try_from(phase_budget.as_millis()).unwrap_or(u64::MAX),
            }));
        }
        Ok(PhaseOutcome {
            artifacts,
            failures,
        })
    }
}
