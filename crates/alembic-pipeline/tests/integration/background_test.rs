use std::sync::Arc;
use std::time::Duration;

use alembic_core::models::{GenerateRequest, SearchFilter};
use alembic_core::traits::IArtifactStore;
use alembic_storage::StorageEngine;
use test_fixtures::ScriptedProvider;

use crate::common::{config, harness, harness_on, DIMS};

#[tokio::test]
async fn reembed_pass_embeds_flagged_artifacts() {
    let h = harness();
    let orphan = test_fixtures::artifact("orphan", "List three database indexes").build();
    h.alembic.store().insert_artifact(&orphan).unwrap();
    assert_eq!(h.alembic.store().pending_reembed(10).unwrap().len(), 1);

    let report = h.alembic.reembed_worker().run_once().await.unwrap();

    assert_eq!(report.embedded, 1);
    assert_eq!(report.failed, 0);
    assert!(h.alembic.store().pending_reembed(10).unwrap().is_empty());
    let stored = h.alembic.artifact("orphan").unwrap().unwrap();
    assert_eq!(stored.embedding.map(|v| v.len()), Some(DIMS));
    let info = stored.embedding_info.unwrap();
    assert_eq!(info.provider, "embedder");
    assert!(info.substituted);
}

#[tokio::test]
async fn background_workers_run_until_shutdown() {
    let h = harness();
    let tasks = h.alembic.spawn_background_every(Some(Duration::from_millis(20)));
    assert_eq!(tasks.len(), 2);

    let orphan = test_fixtures::artifact("late", "Outline a caching strategy").build();
    h.alembic.store().insert_artifact(&orphan).unwrap();

    let mut embedded = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if h.alembic.store().pending_reembed(10).unwrap().is_empty() {
            embedded = true;
            break;
        }
    }
    assert!(embedded);

    tokio::time::timeout(Duration::from_secs(2), tasks.shutdown())
        .await
        .unwrap();
}

#[tokio::test]
async fn changing_the_embedding_standard_flags_stored_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alembic.db");

    let before = config();
    let store = StorageEngine::open(&path, &before.storage, DIMS).unwrap();
    let h = harness_on(before, ScriptedProvider::generator("writer"), Arc::new(store));
    let result = h
        .alembic
        .generate(GenerateRequest::new("Plan a schema migration"))
        .await
        .unwrap();
    assert_eq!(result.artifacts.len(), 3);
    assert!(h.alembic.store().pending_reembed(10).unwrap().is_empty());
    drop(h);

    let mut after = config();
    after.embedding.dimensions = 2 * DIMS;
    let store = StorageEngine::open(&path, &after.storage, 2 * DIMS).unwrap();
    let h = harness_on(after, ScriptedProvider::generator("writer"), Arc::new(store));

    assert_eq!(h.alembic.store().pending_reembed(10).unwrap().len(), 3);
    let stale = h
        .alembic
        .search("Plan a schema migration", &SearchFilter::default(), 5)
        .await
        .unwrap();
    assert!(stale.is_empty());

    let report = h.alembic.reembed_worker().run_once().await.unwrap();
    assert_eq!(report.embedded, 3);

    let target = &result.artifacts[1].artifact;
    let hits = h
        .alembic
        .search(&target.content, &SearchFilter::default(), 5)
        .await
        .unwrap();
    assert_eq!(hits[0].artifact.id, target.id);
    assert_eq!(
        hits[0].artifact.embedding.as_ref().map(Vec::len),
        Some(2 * DIMS)
    );
}
