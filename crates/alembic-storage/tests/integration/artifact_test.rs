use alembic_core::errors::{AlembicError, StorageError};
use alembic_core::models::{EmbeddingInfo, Phase};
use alembic_core::traits::IArtifactStore;
use alembic_storage::StorageEngine;
use test_fixtures::{artifact, unit_vector};

const DIMS: usize = 8;

#[test]
fn insert_then_get_preserves_every_field() {
    let store = StorageEngine::open_in_memory(DIMS).unwrap();
    let original = artifact("a1", "Write a haiku about rust")
        .phase(Phase::SOLUTIO)
        .provider("openai")
        .tag("poetry")
        .tag("draft")
        .parent("a0")
        .tokens(12, 40)
        .embedding(unit_vector(DIMS, 0, 0.0))
        .build();

    store.insert_artifact(&original).unwrap();
    let loaded = store.get_artifact("a1").unwrap().unwrap();

    assert_eq!(loaded.content, original.content);
    assert_eq!(loaded.phase, original.phase);
    assert_eq!(loaded.tags, original.tags);
    assert_eq!(loaded.lineage, original.lineage);
    assert_eq!(loaded.metadata, original.metadata);
    assert_eq!(loaded.embedding, original.embedding);
    assert_eq!(loaded.embedding_info, original.embedding_info);
    assert_eq!(loaded.content_hash, original.content_hash);
    // Stored at microsecond precision.
    assert_eq!(
        loaded.created_at.timestamp_micros(),
        original.created_at.timestamp_micros()
    );
}

#[test]
fn second_insert_of_same_id_fails() {
    let store = StorageEngine::open_in_memory(DIMS).unwrap();
    let a = artifact("dup", "first").build();
    store.insert_artifact(&a).unwrap();

    let again = artifact("dup", "second").build();
    let err = store.insert_artifact(&again).unwrap_err();
    assert!(matches!(
        err,
        AlembicError::StorageError(StorageError::AlreadyExists { .. })
    ));
    // The original survives untouched.
    assert_eq!(store.get_artifact("dup").unwrap().unwrap().content, "first");
}

#[test]
fn missing_artifact_is_none() {
    let store = StorageEngine::open_in_memory(DIMS).unwrap();
    assert!(store.get_artifact("nope").unwrap().is_none());
    assert!(!store.artifact_exists("nope").unwrap());
}

#[test]
fn artifacts_without_conforming_vectors_are_pending() {
    let store = StorageEngine::open_in_memory(DIMS).unwrap();
    store
        .insert_artifact(&artifact("ok", "x").embedding(unit_vector(DIMS, 1, 0.0)).build())
        .unwrap();
    store.insert_artifact(&artifact("bare", "y").build()).unwrap();
    store
        .insert_artifact(&artifact("wide", "z").embedding(unit_vector(DIMS * 2, 1, 0.0)).build())
        .unwrap();

    let pending: Vec<String> = store
        .pending_reembed(10)
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(pending.len(), 2);
    assert!(pending.contains(&"bare".to_string()));
    assert!(pending.contains(&"wide".to_string()));
}

#[test]
fn unreadable_embedding_does_not_hide_other_pending_artifacts() {
    let store = StorageEngine::open_in_memory(DIMS).unwrap();
    for id in ["bad", "good"] {
        store
            .insert_artifact(&artifact(id, "x").embedding(unit_vector(DIMS, 0, 0.0)).build())
            .unwrap();
    }
    store
        .pool()
        .writer
        .with_conn(|conn| {
            conn.execute_batch(
                "UPDATE artifact_embeddings SET embedding = X'0400000000' WHERE artifact_id = 'bad'",
            )
            .unwrap();
            Ok(())
        })
        .unwrap();
    let ids = vec!["bad".to_string(), "good".to_string()];
    assert_eq!(store.flag_for_reembed(&ids).unwrap(), 2);

    let pending = store.pending_reembed(10).unwrap();
    let mut found: Vec<&str> = pending.iter().map(|a| a.id.as_str()).collect();
    found.sort();
    assert_eq!(found, vec!["bad", "good"]);
    let bad = pending.iter().find(|a| a.id == "bad").unwrap();
    assert!(bad.embedding.is_none());
    assert!(bad.embedding_info.is_none());

    let loaded = store.get_artifact("bad").unwrap().unwrap();
    assert!(loaded.embedding.is_none());
}

#[test]
fn store_embedding_clears_flag() {
    let store = StorageEngine::open_in_memory(DIMS).unwrap();
    store.insert_artifact(&artifact("bare", "y").build()).unwrap();
    assert_eq!(store.pending_reembed(10).unwrap().len(), 1);

    let info = EmbeddingInfo {
        provider: "local".into(),
        model: "hashed".into(),
        dimensions: DIMS,
        requested_provider: "openai".into(),
        substituted: true,
    };
    store
        .store_embedding("bare", &unit_vector(DIMS, 2, 0.0), &info)
        .unwrap();

    assert!(store.pending_reembed(10).unwrap().is_empty());
    let loaded = store.get_artifact("bare").unwrap().unwrap();
    assert_eq!(loaded.embedding_info, Some(info));
}

#[test]
fn store_embedding_for_unknown_artifact_fails() {
    let store = StorageEngine::open_in_memory(DIMS).unwrap();
    let info = EmbeddingInfo {
        provider: "local".into(),
        model: "hashed".into(),
        dimensions: DIMS,
        requested_provider: "local".into(),
        substituted: false,
    };
    let err = store
        .store_embedding("ghost", &unit_vector(DIMS, 0, 0.0), &info)
        .unwrap_err();
    assert!(matches!(
        err,
        AlembicError::StorageError(StorageError::NotFound { .. })
    ));
}

#[test]
fn standard_change_flags_old_vectors() {
    let store = StorageEngine::open_in_memory(DIMS).unwrap();
    store
        .insert_artifact(&artifact("a", "x").embedding(unit_vector(DIMS, 0, 0.0)).build())
        .unwrap();
    store
        .insert_artifact(&artifact("b", "y").embedding(unit_vector(DIMS, 1, 0.0)).build())
        .unwrap();

    // Moving the standard to 16 dims makes both stale.
    assert_eq!(store.flag_dimension_mismatches(16).unwrap(), 2);
    // Already flagged: nothing new.
    assert_eq!(store.flag_dimension_mismatches(16).unwrap(), 0);
}

#[test]
fn explicit_flagging_counts_only_new_flags() {
    let store = StorageEngine::open_in_memory(DIMS).unwrap();
    store
        .insert_artifact(&artifact("a", "x").embedding(unit_vector(DIMS, 0, 0.0)).build())
        .unwrap();
    let ids = vec!["a".to_string(), "ghost".to_string()];
    assert_eq!(store.flag_for_reembed(&ids).unwrap(), 1);
    assert_eq!(store.flag_for_reembed(&ids).unwrap(), 0);
    assert_eq!(store.flag_for_reembed(&[]).unwrap(), 0);
}
