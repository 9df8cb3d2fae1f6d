//! Structured log events for key engine operations.
//!
//! Each function emits a `tracing` event with structured fields.

use alembic_core::models::FallbackEvent;

/// Log a provider substitution inside a fallback chain.
pub fn provider_fallback(event: &FallbackEvent) {
    tracing::warn!(
        event = "provider_fallback",
        capability = %event.capability,
        failed_provider = %event.failed_provider,
        fallback_used = %event.fallback_used,
        reason = %event.reason,
        "provider fallback"
    );
}

/// Log a finished phase.
pub fn phase_completed(request_id: &str, phase: &str, succeeded: usize, failed: usize) {
    tracing::info!(
        event = "phase_completed",
        request_id = %request_id,
        phase = %phase,
        succeeded = succeeded,
        failed = failed,
        "phase completed"
    );
}

/// Log a variant or phase that failed without failing the request.
pub fn partial_failure(request_id: &str, phase: &str, variant: Option<usize>, reason: &str) {
    tracing::warn!(
        event = "partial_failure",
        request_id = %request_id,
        phase = %phase,
        variant = ?variant,
        reason = %reason,
        "partial failure"
    );
}

/// Log a newly active weight vector.
pub fn weights_published(version: u64, events_used: usize) {
    tracing::info!(
        event = "weights_published",
        version = version,
        events_used = events_used,
        "weights published"
    );
}

/// Log a failed training run. Non-fatal.
pub fn training_failed(reason: &str, events: usize) {
    tracing::warn!(
        event = "training_failed",
        reason = %reason,
        events = events,
        "training failed, weights unchanged"
    );
}

/// Log artifacts flagged for re-embedding.
pub fn reembed_flagged(count: usize, dimensions: usize) {
    tracing::info!(
        event = "reembed_flagged",
        count = count,
        dimensions = dimensions,
        "artifacts flagged for re-embedding"
    );
}

/// Log an artifact returned to the caller without being saved.
pub fn persistence_failed(artifact_id: &str, error: &str) {
    tracing::error!(
        event = "persistence_failed",
        artifact_id = %artifact_id,
        error = %error,
        "artifact not durably saved"
    );
}
