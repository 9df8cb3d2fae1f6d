/// Caller misuse. Never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("input text must not be empty")]
    EmptyInput,

    #[error("strategy '{strategy}' requires at least one phase")]
    NoPhases { strategy: String },

    #[error("variant count {count} is outside 1..={max}")]
    InvalidVariantCount { count: i32, max: i32 },

    #[error("temperature {value} is outside 0..=2")]
    InvalidTemperature { value: f64 },

    #[error("max tokens must be positive")]
    InvalidMaxTokens,

    #[error("top_k must be at least 1")]
    InvalidTopK,

    #[error("query vector has {actual} dimensions, standard is {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("target score {value} is outside 0..=1")]
    InvalidTargetScore { value: f64 },

    #[error("invalid feedback: {reason}")]
    InvalidFeedback { reason: String },

    #[error("unknown artifact '{id}'")]
    UnknownArtifact { id: String },

    #[error("unknown selection strategy '{name}'")]
    UnknownStrategy { name: String },

    #[error("unknown phase '{name}'")]
    UnknownPhase { name: String },
}
