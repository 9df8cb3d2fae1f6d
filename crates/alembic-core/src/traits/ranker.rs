use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AlembicResult;
use crate::models::{Artifact, FeedbackEvent, RankingRecord};

/// A previously stored artifact similar to the one being scored.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub artifact_id: String,
    pub similarity: f64,
}

/// Everything a ranker may read besides the artifact itself.
///
/// Built once per scoring call; holding it fixed makes scoring reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingContext {
    /// Reference time for recency decay.
    pub as_of: DateTime<Utc>,
    pub neighbors: Vec<Neighbor>,
    /// Feedback on the artifact and its neighbors.
    pub history: Vec<FeedbackEvent>,
    /// Task the artifact should serve; used by judge rankers.
    pub task: Option<String>,
}

impl RankingContext {
    pub fn empty(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            neighbors: Vec::new(),
            history: Vec::new(),
            task: None,
        }
    }
}

/// Produces a RankingRecord for a candidate artifact.
#[async_trait]
pub trait IRanker: Send + Sync {
    fn name(&self) -> &str;

    async fn score(
        &self,
        artifact: &Artifact,
        context: &RankingContext,
    ) -> AlembicResult<RankingRecord>;
}
