use super::{LearningError, ProviderError, StorageError, ValidationError};
use crate::models::Capability;

/// One provider tried while walking a fallback chain, with why it failed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProviderAttempt {
    pub provider: String,
    pub reason: String,
}

impl std::fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.provider, self.reason)
    }
}

fn join_attempts(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "no provider advertises it".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Umbrella error for every Alembic operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlembicError {
    #[error("no capable provider available for {capability}: {}", join_attempts(.attempts))]
    ProviderUnavailable {
        capability: Capability,
        attempts: Vec<ProviderAttempt>,
    },

    #[error("provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("learning failure: {0}")]
    LearningFailure(#[from] LearningError),

    #[error("{scope} deadline of {after_ms}ms exceeded")]
    DeadlineExceeded { scope: String, after_ms: u64 },

    #[error("generation produced no usable output: {}", .reasons.join("; "))]
    GenerationFailed { reasons: Vec<String> },

    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl AlembicError {
    /// Validation errors indicate caller misuse and must not be retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ValidationError(_) | Self::Config { .. })
    }
}

impl From<serde_json::Error> for AlembicError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
