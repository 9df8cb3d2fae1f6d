//! StorageEngine: owns the ConnectionPool, runs migrations at open, and
//! implements IArtifactStore.

use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use alembic_core::config::StorageConfig;
use alembic_core::errors::AlembicResult;
use alembic_core::models::{
    Artifact, EmbeddingInfo, FeedbackEvent, RankingRecord, SearchFilter, SearchOptions,
    SearchOutcome, TrainingRun, WeightVector,
};
use alembic_core::traits::IArtifactStore;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{
    artifact_crud, feedback_ops, lexical_search, ranking_ops, vector_search, weight_ops,
};

pub struct StorageEngine {
    pool: ConnectionPool,
    /// Dimensionality of the embedding standard.
    dimensions: usize,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path, config: &StorageConfig, dimensions: usize) -> AlembicResult<Self> {
        // Writer opens first so the file and WAL exist before readers attach.
        let pool = ConnectionPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        let version = pool.writer.with_conn(migrations::run_migrations)?;
        info!(path = %path.display(), schema_version = version, dimensions, "storage opened");
        Ok(Self { pool, dimensions })
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory(dimensions: usize) -> AlembicResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        pool.writer.with_conn(migrations::run_migrations)?;
        Ok(Self { pool, dimensions })
    }

    /// File-backed when `db_path` is set, in-memory otherwise.
    pub fn from_config(config: &StorageConfig, dimensions: usize) -> AlembicResult<Self> {
        match &config.db_path {
            Some(path) => Self::open(Path::new(path), config, dimensions),
            None => Self::open_in_memory(dimensions),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn schema_version(&self) -> AlembicResult<u32> {
        self.with_reader(migrations::current_version)
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Execute a read-only query on the read pool, or on the writer in memory.
    fn with_reader<F, T>(&self, f: F) -> AlembicResult<T>
    where
        F: FnOnce(&Connection) -> AlembicResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f),
        }
    }

    fn with_writer<F, T>(&self, f: F) -> AlembicResult<T>
    where
        F: FnOnce(&Connection) -> AlembicResult<T>,
    {
        self.pool.writer.with_conn(f)
    }
}

impl IArtifactStore for StorageEngine {
    fn insert_artifact(&self, artifact: &Artifact) -> AlembicResult<String> {
        self.with_writer(|conn| {
            artifact_crud::insert_artifact(conn, artifact, self.dimensions)
        })?;
        Ok(artifact.id.clone())
    }

    fn get_artifact(&self, id: &str) -> AlembicResult<Option<Artifact>> {
        self.with_reader(|conn| artifact_crud::get_artifact(conn, id))
    }

    fn artifact_exists(&self, id: &str) -> AlembicResult<bool> {
        self.with_reader(|conn| artifact_crud::artifact_exists(conn, id))
    }

    fn store_embedding(
        &self,
        id: &str,
        vector: &[f32],
        info: &EmbeddingInfo,
    ) -> AlembicResult<()> {
        self.with_writer(|conn| artifact_crud::store_embedding(conn, id, vector, info))
    }

    fn flag_dimension_mismatches(&self, dimensions: usize) -> AlembicResult<usize> {
        self.with_writer(|conn| artifact_crud::flag_dimension_mismatches(conn, dimensions))
    }

    fn flag_for_reembed(&self, ids: &[String]) -> AlembicResult<usize> {
        self.with_writer(|conn| artifact_crud::flag_for_reembed(conn, ids))
    }

    fn pending_reembed(&self, limit: usize) -> AlembicResult<Vec<Artifact>> {
        self.with_reader(|conn| artifact_crud::pending_reembed(conn, limit))
    }

    fn search_vector(
        &self,
        query: &[f32],
        filter: &SearchFilter,
        options: &SearchOptions,
    ) -> AlembicResult<SearchOutcome> {
        self.with_reader(|conn| {
            vector_search::search_vector(conn, query, filter, options, self.dimensions)
        })
    }

    fn search_hybrid(
        &self,
        query_text: &str,
        query: &[f32],
        filter: &SearchFilter,
        options: &SearchOptions,
    ) -> AlembicResult<SearchOutcome> {
        self.with_reader(|conn| {
            lexical_search::search_hybrid(conn, query_text, query, filter, options, self.dimensions)
        })
    }

    fn save_ranking(&self, record: &RankingRecord) -> AlembicResult<()> {
        self.with_writer(|conn| ranking_ops::save_ranking(conn, record))
    }

    fn get_ranking(&self, artifact_id: &str) -> AlembicResult<Option<RankingRecord>> {
        self.with_reader(|conn| ranking_ops::get_ranking(conn, artifact_id))
    }

    fn insert_feedback(&self, event: &FeedbackEvent) -> AlembicResult<i64> {
        self.with_writer(|conn| feedback_ops::insert_feedback(conn, event))
    }

    fn feedback_since(&self, cursor: i64, limit: usize) -> AlembicResult<Vec<FeedbackEvent>> {
        self.with_reader(|conn| feedback_ops::feedback_since(conn, cursor, limit))
    }

    fn feedback_for_artifacts(&self, ids: &[String]) -> AlembicResult<Vec<FeedbackEvent>> {
        self.with_reader(|conn| feedback_ops::feedback_for_artifacts(conn, ids))
    }

    fn save_weight_vector(&self, weights: &WeightVector, reason: &str) -> AlembicResult<()> {
        self.with_writer(|conn| weight_ops::save_weight_vector(conn, weights, reason))
    }

    fn latest_weight_vector(&self) -> AlembicResult<Option<WeightVector>> {
        self.with_reader(weight_ops::latest_weight_vector)
    }

    fn weight_vector(&self, version: u64) -> AlembicResult<Option<WeightVector>> {
        self.with_reader(|conn| weight_ops::weight_vector(conn, version))
    }

    fn record_training_run(&self, run: &TrainingRun) -> AlembicResult<()> {
        self.with_writer(|conn| weight_ops::record_training_run(conn, run))
    }

    fn last_training_cursor(&self) -> AlembicResult<i64> {
        self.with_reader(weight_ops::last_training_cursor)
    }
}
