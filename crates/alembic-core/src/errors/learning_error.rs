/// Training failures. Always non-fatal: prior weights stay active.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LearningError {
    #[error("insufficient feedback: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("malformed feedback event {event_id}: {reason}")]
    MalformedFeedback { event_id: i64, reason: String },

    #[error("training produced a non-finite weight for {factor}")]
    NonFiniteWeight { factor: String },

    #[error("weight store unavailable: {reason}")]
    WeightStoreUnavailable { reason: String },
}
