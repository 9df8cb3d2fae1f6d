//! Fallback chain: walk an ordered provider list until one succeeds.
//!
//! Every failure becomes a [`ProviderAttempt`]; exhausting the chain returns
//! them all inside `ProviderUnavailable`. When a later provider rescues
//! earlier failures, the walk returns one [`FallbackEvent`] per failure.

use std::sync::Arc;

use alembic_core::errors::{AlembicError, AlembicResult, ProviderAttempt, ProviderError};
use alembic_core::models::{Capability, FallbackEvent, GenerationRequest, GenerationResponse};
use alembic_core::traits::IProvider;
use alembic_observability::tracing_setup::events;
use alembic_observability::SharedMetrics;
use chrono::Utc;
use tracing::{debug, warn};

/// A successful chain walk.
#[derive(Debug, Clone)]
pub struct Routed<T> {
    pub value: T,
    /// Provider that produced `value`.
    pub provider: String,
    /// Failures the winning provider recovered from, in chain order.
    pub fallbacks: Vec<FallbackEvent>,
}

/// Walks provider chains and records per-provider metrics.
#[derive(Debug, Clone, Default)]
pub struct FallbackChain {
    metrics: SharedMetrics,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: SharedMetrics) -> Self {
        Self { metrics }
    }

    /// Generate with the first provider that succeeds.
    pub async fn generate(
        &self,
        providers: &[Arc<dyn IProvider>],
        request: &GenerationRequest,
    ) -> AlembicResult<Routed<GenerationResponse>> {
        let mut attempts = Vec::new();
        for provider in providers {
            match provider.generate(request).await {
                Ok(response) => {
                    return Ok(self.routed(Capability::Generation, attempts, provider.name(), response))
                }
                Err(e) => self.note_failure(Capability::Generation, provider.name(), &e, &mut attempts),
            }
        }
        Err(self.exhausted(Capability::Generation, attempts))
    }

    /// Embed with the first provider that returns a vector of `dimensions`.
    ///
    /// A vector of any other length counts as that provider failing.
    pub async fn embed(
        &self,
        providers: &[Arc<dyn IProvider>],
        text: &str,
        dimensions: usize,
    ) -> AlembicResult<Routed<Vec<f32>>> {
        let mut attempts = Vec::new();
        for provider in providers {
            let result = provider.embed(text).await.and_then(|vector| {
                if vector.len() == dimensions {
                    Ok(vector)
                } else {
                    Err(ProviderError::DimensionMismatch {
                        provider: provider.name().to_string(),
                        expected: dimensions,
                        actual: vector.len(),
                    })
                }
            });
            match result {
                Ok(vector) => {
                    return Ok(self.routed(Capability::Embedding, attempts, provider.name(), vector))
                }
                Err(e) => self.note_failure(Capability::Embedding, provider.name(), &e, &mut attempts),
            }
        }
        Err(self.exhausted(Capability::Embedding, attempts))
    }

    fn note_failure(
        &self,
        capability: Capability,
        provider: &str,
        error: &ProviderError,
        attempts: &mut Vec<ProviderAttempt>,
    ) {
        warn!(
            provider,
            capability = %capability,
            error = %error,
            "provider failed, trying next in chain"
        );
        self.metrics.record(|m| m.provider.record_error(provider));
        attempts.push(ProviderAttempt {
            provider: provider.to_string(),
            reason: error.to_string(),
        });
    }

    fn exhausted(&self, capability: Capability, attempts: Vec<ProviderAttempt>) -> AlembicError {
        self.metrics.record(|m| m.provider.record_exhausted());
        AlembicError::ProviderUnavailable {
            capability,
            attempts,
        }
    }

    fn routed<T>(
        &self,
        capability: Capability,
        failures: Vec<ProviderAttempt>,
        used: &str,
        value: T,
    ) -> Routed<T> {
        self.metrics.record(|m| {
            m.provider.record_success(used);
            m.provider.record_fallbacks(failures.len());
        });
        if !failures.is_empty() {
            debug!(capability = %capability, fallback = used, failed = failures.len(), "fell back");
        }
        let now = Utc::now();
        let fallbacks: Vec<FallbackEvent> = failures
            .into_iter()
            .map(|a| FallbackEvent {
                capability,
                failed_provider: a.provider,
                reason: a.reason,
                fallback_used: used.to_string(),
                timestamp: now,
            })
            .collect();
        for event in &fallbacks {
            events::provider_fallback(event);
        }
        Routed {
            value,
            provider: used.to_string(),
            fallbacks,
        }
    }
}
