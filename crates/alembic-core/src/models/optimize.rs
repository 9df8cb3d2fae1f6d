use serde::{Deserialize, Serialize};

use super::Artifact;

/// An Optimize call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub artifact_id: String,
    pub task_description: String,
    pub max_iterations: u32,
    pub target_score: f64,
    pub provider: Option<String>,
}

/// Outcome of the refine-and-rescore loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResult {
    pub original_id: String,
    /// Best artifact seen; the original when nothing beat it.
    pub best: Artifact,
    pub original_score: f64,
    pub final_score: f64,
    pub improvement: f64,
    pub iterations: u32,
    /// Iteration at which the target was reached, if it was.
    pub converged_at: Option<u32>,
    /// Error that ended refinement early. `best` is the best seen before it.
    #[serde(default)]
    pub stopped_by: Option<String>,
}
