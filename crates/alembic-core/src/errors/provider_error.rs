/// Failures of a single provider invocation. Recovered by advancing the fallback chain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("provider '{provider}' timed out after {after_ms}ms")]
    Timeout { provider: String, after_ms: u64 },

    #[error("provider '{provider}' rate limited the request")]
    RateLimited { provider: String },

    #[error("provider '{provider}' returned a malformed response: {reason}")]
    MalformedResponse { provider: String, reason: String },

    #[error("provider '{provider}' request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("provider '{provider}' rejected the request: {reason}")]
    Rejected { provider: String, reason: String },

    #[error("provider '{provider}' does not support {capability}")]
    Unsupported { provider: String, capability: String },

    #[error("provider '{provider}' produced {actual}-dim embedding, standard is {expected}")]
    DimensionMismatch {
        provider: String,
        expected: usize,
        actual: usize,
    },

    #[error("provider '{name}' is not registered")]
    NotRegistered { name: String },
}

impl ProviderError {
    /// Whether retrying the same provider might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::RequestFailed { .. }
        )
    }
}
