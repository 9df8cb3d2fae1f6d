//! Training runs by outcome and the feedback they consumed.

use alembic_core::models::{TrainingOutcome, TrainingRun};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningMetrics {
    pub runs: u64,
    pub published: u64,
    pub unchanged: u64,
    pub failed: u64,
    pub events_used: u64,
    pub events_skipped: u64,
    pub events_quarantined: u64,
    pub last_published_version: Option<u64>,
}

impl LearningMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_run(&mut self, run: &TrainingRun) {
        self.runs += 1;
        self.events_used += run.events_used as u64;
        self.events_skipped += run.skipped as u64;
        self.events_quarantined += run.quarantined.len() as u64;
        match run.outcome {
            TrainingOutcome::Published { version } => {
                self.published += 1;
                self.last_published_version = Some(version);
            }
            TrainingOutcome::Unchanged => self.unchanged += 1,
            TrainingOutcome::Failed { .. } => self.failed += 1,
        }
    }
}
