use std::sync::Arc;

use alembic_core::config::AlembicConfig;
use alembic_core::errors::{AlembicResult, StorageError};
use alembic_core::models::{
    Artifact, EmbeddingInfo, FeedbackEvent, RankingRecord, SearchFilter, SearchOptions,
    SearchOutcome, TrainingRun, WeightVector,
};
use alembic_core::traits::IArtifactStore;
use alembic_pipeline::Alembic;
use alembic_providers::ProviderRegistry;
use alembic_storage::StorageEngine;
use test_fixtures::ScriptedProvider;

pub const DIMS: usize = 16;

pub struct Harness {
    pub alembic: Alembic,
    pub writer: Arc<ScriptedProvider>,
    pub embedder: Arc<ScriptedProvider>,
}

pub fn config() -> AlembicConfig {
    let mut config = AlembicConfig::default();
    config.embedding.dimensions = DIMS;
    config.storage.db_path = None;
    config
}

/// Writer + embedder over an in-memory store.
pub fn harness() -> Harness {
    harness_with(config(), ScriptedProvider::generator("writer"))
}

pub fn harness_with(config: AlembicConfig, writer: ScriptedProvider) -> Harness {
    let store = Arc::new(StorageEngine::open_in_memory(config.embedding.dimensions).unwrap());
    harness_on(config, writer, store)
}

pub fn harness_on(
    config: AlembicConfig,
    writer: ScriptedProvider,
    store: Arc<dyn IArtifactStore>,
) -> Harness {
    let writer = Arc::new(writer);
    let embedder = Arc::new(ScriptedProvider::embedder("embedder", config.embedding.dimensions));
    let mut registry = ProviderRegistry::new();
    registry.register(writer.clone()).unwrap();
    registry.register(embedder.clone()).unwrap();
    let alembic = Alembic::with_parts(config, registry, store).unwrap();
    Harness {
        alembic,
        writer,
        embedder,
    }
}

/// Store that fails the selected writes; everything else delegates.
pub struct FaultyStore {
    pub inner: StorageEngine,
    pub fail_inserts: bool,
    pub fail_flags: bool,
}

impl FaultyStore {
    pub fn failing_inserts() -> Self {
        Self {
            inner: StorageEngine::open_in_memory(DIMS).unwrap(),
            fail_inserts: true,
            fail_flags: false,
        }
    }

    pub fn failing_flags() -> Self {
        Self {
            inner: StorageEngine::open_in_memory(DIMS).unwrap(),
            fail_inserts: false,
            fail_flags: true,
        }
    }
}

fn broken() -> alembic_core::AlembicError {
    StorageError::SqliteError {
        message: "disk I/O error".to_string(),
    }
    .into()
}

impl IArtifactStore for FaultyStore {
    fn insert_artifact(&self, artifact: &Artifact) -> AlembicResult<String> {
        if self.fail_inserts {
            return Err(broken());
        }
        self.inner.insert_artifact(artifact)
    }
    fn get_artifact(&self, id: &str) -> AlembicResult<Option<Artifact>> {
        self.inner.get_artifact(id)
    }
    fn artifact_exists(&self, id: &str) -> AlembicResult<bool> {
        self.inner.artifact_exists(id)
    }
    fn store_embedding(&self, id: &str, vector: &[f32], info: &EmbeddingInfo) -> AlembicResult<()> {
        self.inner.store_embedding(id, vector, info)
    }
    fn flag_dimension_mismatches(&self, dimensions: usize) -> AlembicResult<usize> {
        self.inner.flag_dimension_mismatches(dimensions)
    }
    fn flag_for_reembed(&self, ids: &[String]) -> AlembicResult<usize> {
        if self.fail_flags {
            return Err(broken());
        }
        self.inner.flag_for_reembed(ids)
    }
    fn pending_reembed(&self, limit: usize) -> AlembicResult<Vec<Artifact>> {
        self.inner.pending_reembed(limit)
    }
    fn search_vector(
        &self,
        query: &[f32],
        filter: &SearchFilter,
        options: &SearchOptions,
    ) -> AlembicResult<SearchOutcome> {
        self.inner.search_vector(query, filter, options)
    }
    fn search_hybrid(
        &self,
        query_text: &str,
        query: &[f32],
        filter: &SearchFilter,
        options: &SearchOptions,
    ) -> AlembicResult<SearchOutcome> {
        self.inner.search_hybrid(query_text, query, filter, options)
    }
    fn save_ranking(&self, record: &RankingRecord) -> AlembicResult<()> {
        self.inner.save_ranking(record)
    }
    fn get_ranking(&self, artifact_id: &str) -> AlembicResult<Option<RankingRecord>> {
        self.inner.get_ranking(artifact_id)
    }
    fn insert_feedback(&self, event: &FeedbackEvent) -> AlembicResult<i64> {
        self.inner.insert_feedback(event)
    }
    fn feedback_since(&self, cursor: i64, limit: usize) -> AlembicResult<Vec<FeedbackEvent>> {
        self.inner.feedback_since(cursor, limit)
    }
    fn feedback_for_artifacts(&self, ids: &[String]) -> AlembicResult<Vec<FeedbackEvent>> {
        self.inner.feedback_for_artifacts(ids)
    }
    fn save_weight_vector(&self, weights: &WeightVector, reason: &str) -> AlembicResult<()> {
        self.inner.save_weight_vector(weights, reason)
    }
    fn latest_weight_vector(&self) -> AlembicResult<Option<WeightVector>> {
        self.inner.latest_weight_vector()
    }
    fn weight_vector(&self, version: u64) -> AlembicResult<Option<WeightVector>> {
        self.inner.weight_vector(version)
    }
    fn record_training_run(&self, run: &TrainingRun) -> AlembicResult<()> {
        self.inner.record_training_run(run)
    }
    fn last_training_cursor(&self) -> AlembicResult<i64> {
        self.inner.last_training_cursor()
    }
}
