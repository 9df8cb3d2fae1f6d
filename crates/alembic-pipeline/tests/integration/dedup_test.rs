use std::time::Duration;

use alembic_core::models::{GenerateRequest, SelectionStrategy};
use test_fixtures::ScriptedProvider;

use crate::common::{config, harness_with};

fn ids(result: &alembic_core::models::GenerateResult) -> Vec<String> {
    result.artifacts.iter().map(|g| g.artifact.id.clone()).collect()
}

#[tokio::test]
async fn identical_concurrent_requests_share_provider_calls() {
    let writer = ScriptedProvider::generator("writer").with_delay(Duration::from_millis(80));
    let h = harness_with(config(), writer);
    let request = GenerateRequest::new("Create a login endpoint");

    let (first, second) = tokio::join!(
        h.alembic.generate(request.clone()),
        h.alembic.generate(request)
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    // One invocation per phase for both callers together.
    assert_eq!(h.writer.generate_calls(), 3);
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(
        first.artifacts[0].artifact.lineage.request_id,
        second.artifacts[0].artifact.lineage.request_id
    );
    assert_eq!(h.alembic.in_flight_phases(), 0);
}

#[tokio::test]
async fn cascade_requests_share_the_whole_chain() {
    let writer = ScriptedProvider::generator("writer").with_delay(Duration::from_millis(80));
    let h = harness_with(config(), writer);
    let request = GenerateRequest::new("Design a cache")
        .with_variants(2)
        .with_strategy(SelectionStrategy::Cascade);

    let (first, second) = tokio::join!(
        h.alembic.generate(request.clone()),
        h.alembic.generate(request)
    );

    assert_eq!(h.writer.generate_calls(), 4);
    assert_eq!(ids(&first.unwrap()), ids(&second.unwrap()));
}

#[tokio::test]
async fn differing_parameters_are_not_shared() {
    let writer = ScriptedProvider::generator("writer").with_delay(Duration::from_millis(40));
    let h = harness_with(config(), writer);
    let base = GenerateRequest::new("Create a login endpoint");

    let (a, b) = tokio::join!(
        h.alembic.generate(base.clone()),
        h.alembic.generate(base.with_temperature(0.2))
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(h.writer.generate_calls(), 6);
}

#[tokio::test]
async fn sequential_identical_requests_run_again() {
    let h = harness_with(config(), ScriptedProvider::generator("writer"));
    let request = GenerateRequest::new("Create a login endpoint");

    let first = h.alembic.generate(request.clone()).await.unwrap();
    let second = h.alembic.generate(request).await.unwrap();

    assert_eq!(h.writer.generate_calls(), 6);
    assert_ne!(ids(&first), ids(&second));
}
