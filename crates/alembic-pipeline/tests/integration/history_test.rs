use alembic_core::config::AlembicConfig;
use alembic_core::models::{GenerateRequest, Phase, RankingRecord, ScoreSource};
use alembic_core::traits::IArtifactStore;
use chrono::Utc;
use test_fixtures::{artifact, ScriptedProvider};

use crate::common::{config, harness_with, Harness};

const INPUT: &str = "Write a release announcement";

fn enhanced() -> AlembicConfig {
    let mut config = config();
    config.pipeline.history_enhancement = true;
    config.pipeline.history_examples = 2;
    config
}

/// Store a past artifact whose vector matches `INPUT` exactly.
fn remember(h: &Harness, id: &str, content: &str, aggregate: Option<f64>) {
    let store = h.alembic.store();
    store
        .insert_artifact(
            &artifact(id, content)
                .phase(Phase::SOLUTIO)
                .embedding(h.embedder.vector_for(INPUT))
                .build(),
        )
        .unwrap();
    if let Some(aggregate) = aggregate {
        store
            .save_ranking(&RankingRecord {
                artifact_id: id.to_string(),
                factors: None,
                aggregate,
                source: ScoreSource::Weighted { weight_version: 1 },
                computed_at: Utc::now(),
            })
            .unwrap();
    }
}

fn single_phase() -> GenerateRequest {
    GenerateRequest::new(INPUT).with_phases(vec![Phase::solutio()])
}

#[tokio::test]
async fn best_ranked_past_artifacts_become_hints() {
    let h = harness_with(enhanced(), ScriptedProvider::generator("writer"));
    remember(&h, "weak", "Announce the release briefly", Some(0.3));
    remember(&h, "strong", "Announce the release with highlights and upgrade steps", Some(0.9));
    remember(&h, "unranked", "Release notes draft", None);

    h.alembic.generate(single_phase()).await.unwrap();

    let prompt = &h.writer.prompts()[0];
    let strong = prompt.find("upgrade steps").unwrap();
    let weak = prompt.find("Announce the release briefly").unwrap();
    assert!(strong < weak);
    assert!(prompt.contains("scored 0.90"));
    assert!(!prompt.contains("Release notes draft"));
}

#[tokio::test]
async fn history_is_off_by_default() {
    let h = harness_with(config(), ScriptedProvider::generator("writer"));
    remember(&h, "strong", "Announce the release with highlights and upgrade steps", Some(0.9));

    h.alembic.generate(single_phase()).await.unwrap();

    let prompt = &h.writer.prompts()[0];
    assert!(!prompt.contains("Reference example"));
}

#[tokio::test]
async fn empty_history_adds_no_hints() {
    let h = harness_with(enhanced(), ScriptedProvider::generator("writer"));

    let result = h.alembic.generate(single_phase()).await.unwrap();

    assert_eq!(result.artifacts.len(), 1);
    assert!(!h.writer.prompts()[0].contains("Reference example"));
}
