use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::{GenerationRequest, GenerationResponse, ProviderDescriptor};

/// A generation and/or embedding backend.
///
/// Invocation is the only operation in the engine that suspends on I/O.
#[async_trait]
pub trait IProvider: Send + Sync {
    /// Static capability record.
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Human-readable provider name.
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Produce a completion.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError>;

    /// Embed a text. Providers without native embeddings return `Unsupported`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Advisory health probe. Used to reorder preference, never to skip an attempt.
    async fn is_available(&self) -> bool;
}
