use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a training run did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrainingOutcome {
    Published { version: u64 },
    Unchanged,
    Failed { reason: String },
}

/// Audit record of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRun {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub events_used: usize,
    /// Events read but carrying no factor signal (unranked or judged artifacts).
    #[serde(default)]
    pub skipped: usize,
    /// Ids of events whose value is out of range for their kind.
    #[serde(default)]
    pub quarantined: Vec<i64>,
    /// Highest feedback id consumed; the next run starts after it.
    pub cursor: i64,
    pub outcome: TrainingOutcome,
}
