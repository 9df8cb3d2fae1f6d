use crate::errors::AlembicResult;
use crate::models::{
    Artifact, EmbeddingInfo, FeedbackEvent, RankingRecord, SearchFilter, SearchOptions,
    SearchOutcome, TrainingRun, WeightVector,
};

/// Persistence for artifacts, embeddings, rankings, feedback, and weight history.
///
/// Writes are serialized; reads and searches may run concurrently.
pub trait IArtifactStore: Send + Sync {
    // --- Artifacts ---
    /// Insert-once: a second insert of the same id fails with `AlreadyExists`.
    fn insert_artifact(&self, artifact: &Artifact) -> AlembicResult<String>;
    fn get_artifact(&self, id: &str) -> AlembicResult<Option<Artifact>>;
    fn artifact_exists(&self, id: &str) -> AlembicResult<bool>;

    // --- Embeddings ---
    fn store_embedding(&self, id: &str, vector: &[f32], info: &EmbeddingInfo)
        -> AlembicResult<()>;
    /// Flag every artifact whose stored dimensions differ from `dimensions`,
    /// plus every artifact with no embedding. Returns the number newly flagged.
    fn flag_dimension_mismatches(&self, dimensions: usize) -> AlembicResult<usize>;
    fn flag_for_reembed(&self, ids: &[String]) -> AlembicResult<usize>;
    fn pending_reembed(&self, limit: usize) -> AlembicResult<Vec<Artifact>>;

    // --- Search ---
    fn search_vector(
        &self,
        query: &[f32],
        filter: &SearchFilter,
        options: &SearchOptions,
    ) -> AlembicResult<SearchOutcome>;
    fn search_hybrid(
        &self,
        query_text: &str,
        query: &[f32],
        filter: &SearchFilter,
        options: &SearchOptions,
    ) -> AlembicResult<SearchOutcome>;

    // --- Rankings ---
    fn save_ranking(&self, record: &RankingRecord) -> AlembicResult<()>;
    fn get_ranking(&self, artifact_id: &str) -> AlembicResult<Option<RankingRecord>>;

    // --- Feedback ---
    fn insert_feedback(&self, event: &FeedbackEvent) -> AlembicResult<i64>;
    /// Events with id greater than `cursor`, oldest first.
    fn feedback_since(&self, cursor: i64, limit: usize) -> AlembicResult<Vec<FeedbackEvent>>;
    fn feedback_for_artifacts(&self, ids: &[String]) -> AlembicResult<Vec<FeedbackEvent>>;

    // --- Weights ---
    fn save_weight_vector(&self, weights: &WeightVector, reason: &str) -> AlembicResult<()>;
    fn latest_weight_vector(&self) -> AlembicResult<Option<WeightVector>>;
    fn weight_vector(&self, version: u64) -> AlembicResult<Option<WeightVector>>;
    fn record_training_run(&self, run: &TrainingRun) -> AlembicResult<()>;
    /// Cursor of the last successful (published or unchanged) run, 0 if none.
    fn last_training_cursor(&self) -> AlembicResult<i64>;
}
