use alembic_core::errors::{AlembicError, StorageError};
use alembic_core::models::{
    FactorScores, FeedbackEvent, FeedbackKind, RankingRecord, ScoreSource, TrainingOutcome,
    TrainingRun, WeightVector,
};
use alembic_core::traits::IArtifactStore;
use alembic_storage::StorageEngine;
use chrono::Utc;
use test_fixtures::artifact;

fn store_with(ids: &[&str]) -> StorageEngine {
    let store = StorageEngine::open_in_memory(4).unwrap();
    for id in ids {
        store.insert_artifact(&artifact(id, "content").build()).unwrap();
    }
    store
}

#[test]
fn rankings_round_trip_and_replace() {
    let store = store_with(&["a"]);
    let mut record = RankingRecord {
        artifact_id: "a".into(),
        factors: Some(FactorScores {
            temperature: 1.0,
            token_efficiency: 0.5,
            relevance: 0.25,
            historical: 0.5,
        }),
        aggregate: 0.55,
        source: ScoreSource::Weighted { weight_version: 1 },
        computed_at: Utc::now(),
    };
    store.save_ranking(&record).unwrap();
    let loaded = store.get_ranking("a").unwrap().unwrap();
    assert_eq!(loaded.factors, record.factors);
    assert_eq!(loaded.weight_version(), Some(1));

    record.factors = None;
    record.source = ScoreSource::Judge {
        provider: "openai".into(),
        reasoning: "clear".into(),
    };
    store.save_ranking(&record).unwrap();
    let loaded = store.get_ranking("a").unwrap().unwrap();
    assert!(loaded.factors.is_none());
    assert_eq!(loaded.weight_version(), None);
}

#[test]
fn feedback_requires_known_artifact() {
    let store = store_with(&[]);
    let err = store
        .insert_feedback(&FeedbackEvent::new("ghost", FeedbackKind::UserRating, 4.0))
        .unwrap_err();
    assert!(matches!(
        err,
        AlembicError::StorageError(StorageError::NotFound { .. })
    ));
}

#[test]
fn feedback_since_pages_by_cursor() {
    let store = store_with(&["a", "b"]);
    let mut ids = Vec::new();
    for (artifact_id, value) in [("a", 5.0), ("b", 1.0), ("a", 3.0)] {
        ids.push(
            store
                .insert_feedback(&FeedbackEvent::new(artifact_id, FeedbackKind::UserRating, value))
                .unwrap(),
        );
    }
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let first = store.feedback_since(0, 2).unwrap();
    assert_eq!(first.len(), 2);
    let rest = store.feedback_since(first[1].id, 10).unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].value, 3.0);

    let for_a = store.feedback_for_artifacts(&["a".to_string()]).unwrap();
    assert_eq!(for_a.len(), 2);
    assert!(for_a.iter().all(|e| e.artifact_id == "a"));
}

#[test]
fn weight_versions_are_append_only() {
    let store = store_with(&[]);
    assert!(store.latest_weight_vector().unwrap().is_none());

    let v1 = WeightVector::initial(0.2, 0.2, 0.3, 0.3);
    store.save_weight_vector(&v1, "initial").unwrap();
    let v2 = v1.next([0.25, 0.2, 0.3, 0.25]);
    store.save_weight_vector(&v2, "trained").unwrap();

    assert_eq!(store.latest_weight_vector().unwrap().unwrap().version, 2);
    assert_eq!(store.weight_vector(1).unwrap().unwrap().temperature, 0.2);

    let err = store.save_weight_vector(&v1, "again").unwrap_err();
    assert!(matches!(
        err,
        AlembicError::StorageError(StorageError::AlreadyExists { .. })
    ));
}

#[test]
fn cursor_follows_consumed_feedback() {
    let store = store_with(&[]);
    assert_eq!(store.last_training_cursor().unwrap(), 0);
    let run = |cursor, outcome| TrainingRun {
        started_at: Utc::now(),
        finished_at: Utc::now(),
        events_used: 3,
        skipped: 0,
        quarantined: Vec::new(),
        cursor,
        outcome,
    };
    let failed = || TrainingOutcome::Failed {
        reason: "insufficient".into(),
    };
    store
        .record_training_run(&run(7, TrainingOutcome::Published { version: 2 }))
        .unwrap();
    // A held batch records the cursor it started from.
    store.record_training_run(&run(7, failed())).unwrap();
    assert_eq!(store.last_training_cursor().unwrap(), 7);
    // A full batch with no usable signal is consumed even though it failed.
    store.record_training_run(&run(12, failed())).unwrap();
    assert_eq!(store.last_training_cursor().unwrap(), 12);
}
