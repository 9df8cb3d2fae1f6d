//! `Alembic`: owns every engine and exposes the core operations.
//!
//! Generate, Search, HybridSearch, Optimize, ListProviders, and
//! RecordFeedback are the only entry points an outer layer (CLI, HTTP, RPC)
//! is expected to call.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn, Instrument};

use alembic_core::config::{AlembicConfig, RankerKind};
use alembic_core::errors::{AlembicResult, ValidationError};
use alembic_core::models::{
    Artifact, FeedbackEvent, FeedbackKind, GenerateRequest, GenerateResult, OptimizeRequest,
    OptimizeResult, ProviderStatus, RankingRecord, SearchFilter, SearchHit, SearchOptions,
    SearchOutcome, TrainingRun,
};
use alembic_core::traits::{IArtifactStore, IRanker};
use alembic_learning::{bootstrap_weights, LearningEngine, LearningWorker};
use alembic_observability::{search_span, MetricsCollector, SharedMetrics};
use alembic_observability::tracing_setup::events;
use alembic_providers::{EmbeddingRouter, ProviderRegistry};
use alembic_ranking::{JudgeRanker, RankingEngine, WeightStore};
use alembic_storage::StorageEngine;

use crate::maintenance::ReembedWorker;
use crate::orchestrator::Orchestrator;
use crate::phases::PhaseCatalog;

pub struct Alembic {
    orchestrator: Arc<Orchestrator>,
    registry: Arc<ProviderRegistry>,
    router: Arc<EmbeddingRouter>,
    store: Arc<dyn IArtifactStore>,
    weights: Arc<WeightStore>,
    learning: Arc<LearningEngine>,
    metrics: SharedMetrics,
    config: AlembicConfig,
}

/// Handles to the periodic workers started by [`Alembic::spawn_background`].
pub struct BackgroundTasks {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Signal every worker and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

impl Alembic {
    /// Build providers and storage from config.
    pub fn open(config: AlembicConfig) -> AlembicResult<Self> {
        config.validate()?;
        let registry = ProviderRegistry::from_config(&config.providers, &config.embedding)?;
        let store = StorageEngine::from_config(&config.storage, config.embedding.dimensions)?;
        Self::assemble(config, registry, Arc::new(store))
    }

    /// Use a prepared registry and store.
    pub fn with_parts(
        config: AlembicConfig,
        registry: ProviderRegistry,
        store: Arc<dyn IArtifactStore>,
    ) -> AlembicResult<Self> {
        config.validate()?;
        Self::assemble(config, registry, store)
    }

    fn assemble(
        config: AlembicConfig,
        mut registry: ProviderRegistry,
        store: Arc<dyn IArtifactStore>,
    ) -> AlembicResult<Self> {
        let metrics = SharedMetrics::new();

        // Standard change detection.
        let dimensions = config.embedding.dimensions;
        let flagged = store.flag_dimension_mismatches(dimensions)?;
        if flagged > 0 {
            metrics.record(|m| m.storage.record_reembed_flagged(flagged));
            events::reembed_flagged(flagged, dimensions);
        }

        // Weights
        let weights = Arc::new(WeightStore::from_config(&config.ranking));
        bootstrap_weights(store.as_ref(), &weights)?;

        // Providers
        registry.set_metrics(metrics.clone());
        let registry = Arc::new(registry);
        let router = Arc::new(EmbeddingRouter::new(Arc::clone(&registry), &config.embedding));

        // Ranking
        let ranker: Arc<dyn IRanker> = match config.ranking.ranker {
            RankerKind::Weighted => Arc::new(RankingEngine::new(
                Arc::clone(&weights),
                config.ranking.clone(),
            )),
            RankerKind::Judge => Arc::new(JudgeRanker::new(
                Arc::clone(&registry),
                config.ranking.judge_provider.clone(),
            )),
        };

        // Learning
        let learning = Arc::new(
            LearningEngine::new(
                Arc::clone(&store),
                Arc::clone(&weights),
                config.learning.clone(),
            )
            .with_metrics(metrics.clone()),
        );

        // Pipeline
        let catalog = PhaseCatalog::from_config(&config.pipeline)?;
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&registry),
            Arc::clone(&router),
            Arc::clone(&store),
            Arc::clone(&ranker),
            catalog,
            config.pipeline.clone(),
            config.ranking.clone(),
            config.embedding.clone(),
            metrics.clone(),
        ));

        info!(
            providers = registry.len(),
            ranker = ranker.name(),
            weight_version = weights.version(),
            dimensions,
            "alembic ready"
        );
        Ok(Self {
            orchestrator,
            registry,
            router,
            store,
            weights,
            learning,
            metrics,
            config,
        })
    }

    pub fn config(&self) -> &AlembicConfig {
        &self.config
    }

    pub fn weights(&self) -> &Arc<WeightStore> {
        &self.weights
    }

    pub fn store(&self) -> &Arc<dyn IArtifactStore> {
        &self.store
    }

    /// Point-in-time copy of the generation, provider, storage, and learning counters.
    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.snapshot()
    }

    /// Run the phases of `request` and select artifacts per its strategy.
    pub async fn generate(&self, request: GenerateRequest) -> AlembicResult<GenerateResult> {
        self.orchestrator.generate(request).await
    }

    /// Embed `query` and return stored artifacts by cosine similarity.
    pub async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
        top_k: usize,
    ) -> AlembicResult<Vec<SearchHit>> {
        validate_query(query, top_k)?;
        let span = search_span!(top_k, false);
        async {
            let vector = self.router.embed_query(query).await?;
            self.search_by_vector(&vector, filter, top_k)
        }
        .instrument(span)
        .await
    }

    /// Similarity search with a caller-supplied query vector.
    pub fn search_by_vector(
        &self,
        vector: &[f32],
        filter: &SearchFilter,
        top_k: usize,
    ) -> AlembicResult<Vec<SearchHit>> {
        if top_k == 0 {
            return Err(ValidationError::InvalidTopK.into());
        }
        let outcome = self
            .store
            .search_vector(vector, filter, &self.search_options(top_k, 0.0))?;
        Ok(self.flag_mismatched(outcome))
    }

    /// Lexical match blended with vector similarity.
    pub async fn hybrid_search(
        &self,
        query: &str,
        filter: &SearchFilter,
        top_k: usize,
    ) -> AlembicResult<Vec<SearchHit>> {
        validate_query(query, top_k)?;
        let span = search_span!(top_k, true);
        async {
            let vector = self.router.embed_query(query).await?;
            let options = self.search_options(top_k, self.config.embedding.lexical_weight);
            let outcome = self.store.search_hybrid(query, &vector, filter, &options)?;
            Ok(self.flag_mismatched(outcome))
        }
        .instrument(span)
        .await
    }

    /// Iteratively refine a stored artifact toward a task.
    pub async fn optimize(&self, request: OptimizeRequest) -> AlembicResult<OptimizeResult> {
        self.orchestrator.optimize(request).await
    }

    /// Every registered provider with its capabilities and live availability.
    pub async fn list_providers(&self) -> Vec<ProviderStatus> {
        self.registry.list_providers().await
    }

    /// Record an outcome for a stored artifact. Returns the event id.
    pub fn record_feedback(
        &self,
        artifact_id: &str,
        kind: FeedbackKind,
        value: f64,
    ) -> AlembicResult<i64> {
        let event = FeedbackEvent::new(artifact_id, kind, value);
        if event.outcome().is_none() {
            return Err(ValidationError::InvalidFeedback {
                reason: format!("{} value {value} is out of range", kind.as_str()),
            }
            .into());
        }
        if !self.store.artifact_exists(artifact_id)? {
            return Err(ValidationError::UnknownArtifact {
                id: artifact_id.to_string(),
            }
            .into());
        }
        self.store.insert_feedback(&event)
    }

    pub fn artifact(&self, id: &str) -> AlembicResult<Option<Artifact>> {
        self.store.get_artifact(id)
    }

    pub fn ranking(&self, artifact_id: &str) -> AlembicResult<Option<RankingRecord>> {
        self.store.get_ranking(artifact_id)
    }

    /// Run one training pass now instead of waiting for the worker.
    pub fn train(&self) -> AlembicResult<TrainingRun> {
        self.learning.run_once()
    }

    /// Number of phase executions other requests could currently join.
    pub fn in_flight_phases(&self) -> usize {
        self.orchestrator.in_flight_phases()
    }

    pub fn reembed_worker(&self) -> ReembedWorker {
        ReembedWorker::new(
            Arc::clone(&self.store),
            Arc::clone(&self.router),
            &self.config.embedding,
        )
    }

    /// Start the learning and re-embedding workers at their configured periods.
    pub fn spawn_background(&self) -> BackgroundTasks {
        self.spawn_background_every(None)
    }

    /// Like [`spawn_background`](Self::spawn_background) with one period for
    /// every worker.
    pub fn spawn_background_every(&self, period: Option<Duration>) -> BackgroundTasks {
        let (shutdown, rx) = watch::channel(false);
        let mut handles = Vec::new();

        if self.config.learning.enabled {
            let mut worker = LearningWorker::new(Arc::clone(&self.learning));
            if let Some(period) = period {
                worker = worker.with_period(period);
            }
            handles.push(worker.spawn(rx.clone()));
        }

        let mut reembed = self.reembed_worker();
        if let Some(period) = period {
            reembed = reembed.with_period(period);
        }
        handles.push(reembed.spawn(rx));

        BackgroundTasks { shutdown, handles }
    }

    fn search_options(&self, top_k: usize, lexical_weight: f64) -> SearchOptions {
        SearchOptions {
            top_k,
            min_similarity: self.config.embedding.min_similarity,
            lexical_weight,
        }
    }

    /// Queue vectors that no longer match the standard and return the hits.
    /// A failed flag write is logged; the next search reports them again.
    fn flag_mismatched(&self, outcome: SearchOutcome) -> Vec<SearchHit> {
        if !outcome.mismatched.is_empty() {
            match self.store.flag_for_reembed(&outcome.mismatched) {
                Ok(0) => {}
                Ok(flagged) => {
                    self.metrics.record(|m| m.storage.record_reembed_flagged(flagged));
                    events::reembed_flagged(flagged, self.config.embedding.dimensions);
                }
                Err(e) => warn!(
                    count = outcome.mismatched.len(),
                    error = %e,
                    "could not flag mismatched embeddings"
                ),
            }
        }
        outcome.hits
    }
}

fn validate_query(query: &str, top_k: usize) -> Result<(), ValidationError> {
    if query.trim().is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    if top_k == 0 {
        return Err(ValidationError::InvalidTopK);
    }
    Ok(())
}
