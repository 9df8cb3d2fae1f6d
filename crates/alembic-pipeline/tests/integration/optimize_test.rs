use alembic_core::errors::{AlembicError, ValidationError};
use alembic_core::models::{GenerateRequest, OptimizeRequest};

use crate::common::{harness, Harness};

async fn seed(h: &Harness) -> String {
    let result = h
        .alembic
        .generate(GenerateRequest::new("Draft an onboarding checklist"))
        .await
        .unwrap();
    result.artifacts[0].artifact.id.clone()
}

fn request(artifact_id: &str, max_iterations: u32, target_score: f64) -> OptimizeRequest {
    OptimizeRequest {
        artifact_id: artifact_id.to_string(),
        task_description: "onboarding new backend engineers".to_string(),
        max_iterations,
        target_score,
        provider: None,
    }
}

#[tokio::test]
async fn reachable_target_converges_without_refining() {
    let h = harness();
    let id = seed(&h).await;
    let calls = h.writer.generate_calls();

    let result = h.alembic.optimize(request(&id, 3, 0.0)).await.unwrap();

    assert_eq!(result.converged_at, Some(0));
    assert_eq!(result.iterations, 0);
    assert_eq!(result.best.id, id);
    assert_eq!(result.improvement, 0.0);
    assert_eq!(h.writer.generate_calls(), calls);
}

#[tokio::test]
async fn unreachable_target_spends_the_iteration_budget() {
    let h = harness();
    let id = seed(&h).await;
    let calls = h.writer.generate_calls();

    let result = h.alembic.optimize(request(&id, 2, 1.0)).await.unwrap();

    assert_eq!(result.iterations, 2);
    assert_eq!(result.converged_at, None);
    assert_eq!(h.writer.generate_calls(), calls + 2);
    assert!(result.final_score >= result.original_score);
    assert!(result.improvement >= 0.0);

    let prompts = h.writer.prompts();
    assert!(prompts[calls..]
        .iter()
        .all(|p| p.contains("Task: onboarding new backend engineers")));

    if result.best.id != id {
        let stored = h.alembic.artifact(&result.best.id).unwrap().unwrap();
        assert!(stored.lineage.parent_id.is_some());
        assert!(h.alembic.ranking(&stored.id).unwrap().is_some());
    }
}

#[tokio::test]
async fn refinement_starts_from_the_original_content() {
    let h = harness();
    let id = seed(&h).await;
    let original = h.alembic.artifact(&id).unwrap().unwrap();
    let calls = h.writer.generate_calls();

    h.alembic.optimize(request(&id, 1, 1.0)).await.unwrap();

    let prompts = h.writer.prompts();
    assert!(prompts[calls].contains(&original.content));
}

#[tokio::test]
async fn malformed_optimize_requests_are_rejected() {
    let h = harness();
    let id = seed(&h).await;

    let err = h.alembic.optimize(request(&id, 2, 1.5)).await.unwrap_err();
    assert_eq!(
        err,
        AlembicError::ValidationError(ValidationError::InvalidTargetScore { value: 1.5 })
    );

    let err = h.alembic.optimize(request("missing", 2, 0.5)).await.unwrap_err();
    assert_eq!(
        err,
        AlembicError::ValidationError(ValidationError::UnknownArtifact {
            id: "missing".to_string()
        })
    );

    let mut blank = request(&id, 2, 0.5);
    blank.task_description = "   ".to_string();
    let err = h.alembic.optimize(blank).await.unwrap_err();
    assert_eq!(err, AlembicError::ValidationError(ValidationError::EmptyInput));
}

#[tokio::test]
async fn provider_failure_keeps_the_best_refinement_so_far() {
    let h = harness();
    let id = seed(&h).await;
    let calls = h.writer.generate_calls();
    // The first refinement succeeds, every later one fails.
    h.writer.fail_from_call(calls + 1);

    let result = h.alembic.optimize(request(&id, 3, 1.0)).await.unwrap();

    assert_eq!(result.iterations, 2);
    assert_eq!(result.converged_at, None);
    assert!(result
        .stopped_by
        .as_deref()
        .is_some_and(|reason| reason.contains("scripted failure")));
    assert_eq!(h.writer.generate_calls(), calls + 2);
    assert!(result.final_score >= result.original_score);
    if result.best.id != id {
        assert_eq!(result.best.lineage.parent_id.as_deref(), Some(id.as_str()));
    }
}

#[tokio::test]
async fn completed_refinement_reports_no_stop_reason() {
    let h = harness();
    let id = seed(&h).await;

    let result = h.alembic.optimize(request(&id, 1, 1.0)).await.unwrap();

    assert_eq!(result.iterations, 1);
    assert!(result.stopped_by.is_none());
}
