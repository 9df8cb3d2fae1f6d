use crate::errors::AlembicResult;
use crate::models::{FeedbackEvent, WeightVector};

/// Turns accumulated outcomes into a new weight vector.
pub trait ILearner: Send + Sync {
    /// Train on a batch. On failure the active weights must stay untouched.
    fn train(&self, batch: &[FeedbackEvent]) -> AlembicResult<WeightVector>;
}
