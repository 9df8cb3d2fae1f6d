use std::sync::Arc;

use alembic_core::errors::{AlembicError, ValidationError};
use alembic_core::models::{GenerateRequest, Phase, SearchFilter, SelectionStrategy};
use alembic_core::traits::IArtifactStore;
use test_fixtures::{artifact, unit_vector, ScriptedProvider};

use crate::common::{config, harness, harness_on, FaultyStore, DIMS};

#[tokio::test]
async fn search_finds_generated_artifacts_by_content() {
    let h = harness();
    let result = h
        .alembic
        .generate(GenerateRequest::new("Create a login endpoint").with_strategy(SelectionStrategy::All))
        .await
        .unwrap();
    let target = &result.artifacts[1].artifact;

    let hits = h
        .alembic
        .search(&target.content, &SearchFilter::default(), 3)
        .await
        .unwrap();

    assert_eq!(hits[0].artifact.id, target.id);
    assert!((hits[0].similarity - 1.0).abs() < 1e-5);
    let threshold = h.alembic.config().embedding.min_similarity;
    assert!(hits.iter().all(|hit| hit.similarity >= threshold));
}

#[tokio::test]
async fn search_applies_filters_before_ranking() {
    let h = harness();
    let result = h
        .alembic
        .generate(GenerateRequest::new("Create a login endpoint").with_strategy(SelectionStrategy::All))
        .await
        .unwrap();
    let target = &result.artifacts[0].artifact;

    let filter = SearchFilter::default().with_phase(Phase::coagulatio());
    let hits = h.alembic.search(&target.content, &filter, 5).await.unwrap();

    assert!(hits.iter().all(|hit| hit.artifact.phase == Phase::coagulatio()));
    assert!(hits.iter().all(|hit| hit.artifact.id != target.id));
}

#[tokio::test]
async fn hybrid_search_matches_lexically_and_by_vector() {
    let h = harness();
    let result = h
        .alembic
        .generate(GenerateRequest::new("Create a login endpoint").with_strategy(SelectionStrategy::All))
        .await
        .unwrap();
    let target = &result.artifacts[2].artifact;

    let hits = h
        .alembic
        .hybrid_search(&target.content, &SearchFilter::default(), 3)
        .await
        .unwrap();

    assert_eq!(hits[0].artifact.id, target.id);
    assert!(hits[0].lexical.is_some());
}

#[tokio::test]
async fn search_rejects_malformed_queries() {
    let h = harness();
    let empty = h.alembic.search("  ", &SearchFilter::default(), 3).await.unwrap_err();
    assert_eq!(empty, AlembicError::ValidationError(ValidationError::EmptyInput));

    let zero = h
        .alembic
        .hybrid_search("login", &SearchFilter::default(), 0)
        .await
        .unwrap_err();
    assert_eq!(zero, AlembicError::ValidationError(ValidationError::InvalidTopK));

    let wrong_dims = h
        .alembic
        .search_by_vector(&[1.0, 0.0], &SearchFilter::default(), 3)
        .unwrap_err();
    assert!(matches!(
        wrong_dims,
        AlembicError::ValidationError(ValidationError::DimensionMismatch { expected: DIMS, actual: 2 })
    ));
}

#[tokio::test]
async fn unembedded_artifacts_are_invisible_to_vector_search_until_reembedded() {
    let h = harness();
    let orphan = test_fixtures::artifact("orphan", "Write a haiku about tides").build();
    h.alembic.store().insert_artifact(&orphan).unwrap();

    let before = h
        .alembic
        .search("Write a haiku about tides", &SearchFilter::default(), 3)
        .await
        .unwrap();
    assert!(before.iter().all(|hit| hit.artifact.id != "orphan"));

    let report = h.alembic.reembed_worker().run_once().await.unwrap();
    assert_eq!(report.embedded, 1);

    let after = h
        .alembic
        .search("Write a haiku about tides", &SearchFilter::default(), 3)
        .await
        .unwrap();
    assert_eq!(after[0].artifact.id, "orphan");
}

#[tokio::test]
async fn failed_reembed_flagging_still_returns_hits() {
    let store = Arc::new(FaultyStore::failing_flags());
    store
        .insert_artifact(&artifact("fits", "x").embedding(unit_vector(DIMS, 0, 0.0)).build())
        .unwrap();
    store
        .insert_artifact(&artifact("wide", "y").embedding(unit_vector(DIMS * 2, 0, 0.0)).build())
        .unwrap();
    let h = harness_on(config(), ScriptedProvider::generator("writer"), store.clone());

    let hits = h
        .alembic
        .search_by_vector(&unit_vector(DIMS, 0, 0.0), &SearchFilter::default(), 5)
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].artifact.id, "fits");
    assert!(store.flag_for_reembed(&["wide".to_string()]).is_err());
}
