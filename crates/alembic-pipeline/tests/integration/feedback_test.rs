use alembic_core::errors::{AlembicError, ValidationError};
use alembic_core::models::{FeedbackKind, GenerateRequest, TrainingOutcome};

use crate::common::harness;

#[tokio::test]
async fn feedback_is_recorded_for_stored_artifacts() {
    let h = harness();
    let result = h
        .alembic
        .generate(GenerateRequest::new("Summarize the release notes"))
        .await
        .unwrap();
    let id = &result.artifacts[0].artifact.id;

    let first = h.alembic.record_feedback(id, FeedbackKind::UserRating, 4.0).unwrap();
    let second = h.alembic.record_feedback(id, FeedbackKind::EvaluatorScore, 0.9).unwrap();
    assert!(first > 0);
    assert!(second > first);
}

#[tokio::test]
async fn feedback_for_unknown_artifacts_is_rejected() {
    let h = harness();
    let err = h
        .alembic
        .record_feedback("does-not-exist", FeedbackKind::Reuse, 2.0)
        .unwrap_err();
    assert_eq!(
        err,
        AlembicError::ValidationError(ValidationError::UnknownArtifact {
            id: "does-not-exist".to_string()
        })
    );
}

#[tokio::test]
async fn out_of_range_feedback_is_rejected_before_lookup() {
    let h = harness();
    let err = h
        .alembic
        .record_feedback("does-not-exist", FeedbackKind::UserRating, 9.0)
        .unwrap_err();
    assert!(matches!(
        err,
        AlembicError::ValidationError(ValidationError::InvalidFeedback { .. })
    ));
}

#[tokio::test]
async fn training_without_enough_feedback_keeps_weights() {
    let h = harness();
    let result = h
        .alembic
        .generate(GenerateRequest::new("Summarize the release notes"))
        .await
        .unwrap();
    h.alembic
        .record_feedback(&result.artifacts[0].artifact.id, FeedbackKind::UserRating, 5.0)
        .unwrap();
    let before = h.alembic.weights().version();

    let run = h.alembic.train().unwrap();

    assert!(matches!(run.outcome, TrainingOutcome::Failed { .. }));
    assert_eq!(h.alembic.weights().version(), before);
}

#[tokio::test]
async fn list_providers_reports_capabilities_and_availability() {
    let h = harness();
    let providers = h.alembic.list_providers().await;
    let names: Vec<&str> = providers.iter().map(|p| p.descriptor.name.as_str()).collect();
    assert_eq!(names, vec!["writer", "embedder"]);
    assert!(providers.iter().all(|p| p.available));
    assert!(!providers[0].descriptor.supports_embeddings);
    assert!(providers[1].descriptor.supports_embeddings);

    h.writer.set_available(false);
    let providers = h.alembic.list_providers().await;
    assert!(!providers[0].available);
    assert!(providers[1].available);
}
