use std::sync::Arc;
use std::time::Duration;

use alembic_core::config::RankerKind;
use alembic_core::errors::{AlembicError, ValidationError};
use alembic_core::models::{GenerateRequest, Phase, RequestState, ScoreSource, SelectionStrategy};
use alembic_core::traits::IArtifactStore;
use alembic_pipeline::Alembic;
use alembic_providers::ProviderRegistry;
use alembic_storage::StorageEngine;
use test_fixtures::ScriptedProvider;

use crate::common::{config, harness, harness_on, harness_with, FaultyStore, DIMS};

#[tokio::test]
async fn best_per_phase_yields_one_ranked_artifact_per_phase() {
    let h = harness();
    let request = GenerateRequest::new("Create a login endpoint").with_variants(2);

    let result = h.alembic.generate(request).await.unwrap();

    assert_eq!(result.artifacts.len(), 3);
    assert_eq!(h.writer.generate_calls(), 6);
    assert!(!result.has_warnings());
    let phases: Vec<_> = result.artifacts.iter().map(|g| g.artifact.phase.clone()).collect();
    assert_eq!(phases, Phase::builtin());
    for generated in &result.artifacts {
        assert!(generated.durable);
        assert_eq!(generated.artifact.lineage.request_id, result.request_id);
        let ranking = generated.ranking.as_ref().expect("ranked");
        assert_eq!(ranking.artifact_id, generated.artifact.id);
        assert!(matches!(ranking.source, ScoreSource::Weighted { weight_version: 1 }));
        let stored = h.alembic.artifact(&generated.artifact.id).unwrap().unwrap();
        assert_eq!(stored.content, generated.artifact.content);
        assert!(h.alembic.ranking(&generated.artifact.id).unwrap().is_some());
    }
    assert_eq!(result.states.first(), Some(&RequestState::Pending));
    assert_eq!(result.states.last(), Some(&RequestState::Done));
    assert_eq!(result.states.len(), 1 + 3 * 2 + 2);
}

#[tokio::test]
async fn all_strategy_returns_every_variant_in_order() {
    let h = harness();
    let request = GenerateRequest::new("Summarize a changelog")
        .with_variants(2)
        .with_strategy(SelectionStrategy::All);

    let result = h.alembic.generate(request).await.unwrap();

    assert_eq!(result.artifacts.len(), 6);
    let phases: Vec<_> = result
        .artifacts
        .iter()
        .map(|g| g.artifact.phase.as_str().to_string())
        .collect();
    assert_eq!(
        phases,
        vec!["prima-materia", "prima-materia", "solutio", "solutio", "coagulatio", "coagulatio"]
    );
}

#[tokio::test]
async fn cascade_feeds_each_winner_to_the_next_phase() {
    let h = harness();
    let request = GenerateRequest::new("Design a rate limiter")
        .with_variants(3)
        .with_strategy(SelectionStrategy::Cascade);

    let result = h.alembic.generate(request).await.unwrap();

    // N variants for the first phase, one for each later phase.
    assert_eq!(h.writer.generate_calls(), 5);
    assert_eq!(result.artifacts.len(), 3);

    let prompts = h.writer.prompts();
    let a = &result.artifacts[0].artifact;
    let b = &result.artifacts[1].artifact;
    let c = &result.artifacts[2].artifact;
    assert!(prompts[3].contains(&a.content));
    assert!(prompts[4].contains(&b.content));
    assert_eq!(a.lineage.parent_id, None);
    assert_eq!(b.lineage.parent_id.as_deref(), Some(a.id.as_str()));
    assert_eq!(c.lineage.parent_id.as_deref(), Some(b.id.as_str()));
}

#[tokio::test]
async fn independent_phases_all_start_from_the_original_input() {
    let h = harness();
    let request = GenerateRequest::new("Explain borrow checking to a new hire");

    h.alembic.generate(request).await.unwrap();

    for prompt in h.writer.prompts() {
        assert!(prompt.contains("Explain borrow checking to a new hire"));
    }
}

#[tokio::test]
async fn persona_and_hints_reach_every_prompt() {
    let h = harness();
    let request = GenerateRequest {
        persona: Some("senior SRE".into()),
        context_hints: vec!["kubernetes".into()],
        ..GenerateRequest::new("Write an incident runbook")
    };

    h.alembic.generate(request).await.unwrap();

    for prompt in h.writer.prompts() {
        assert!(prompt.contains("senior SRE"));
        assert!(prompt.contains("- kubernetes"));
    }
}

#[tokio::test]
async fn invalid_requests_never_reach_a_provider() {
    let h = harness();
    let cases = [
        GenerateRequest::new("x")
            .with_phases(Vec::new())
            .with_strategy(SelectionStrategy::Cascade),
        GenerateRequest::new("x").with_variants(-1),
        GenerateRequest::new("x").with_variants(0),
        GenerateRequest::new("   "),
        GenerateRequest::new("x").with_temperature(3.5),
        GenerateRequest::new("x").with_phases(vec![Phase::new("nigredo")]),
    ];
    for request in cases {
        let err = h.alembic.generate(request).await.unwrap_err();
        assert!(matches!(err, AlembicError::ValidationError(_)), "{err}");
        assert!(!err.is_retryable());
    }
    assert_eq!(h.writer.generate_calls(), 0);
}

#[tokio::test]
async fn cascade_with_zero_phases_names_the_strategy() {
    let h = harness();
    let request = GenerateRequest::new("x")
        .with_phases(Vec::new())
        .with_strategy(SelectionStrategy::Cascade);
    let err = h.alembic.generate(request).await.unwrap_err();
    assert_eq!(
        err,
        AlembicError::ValidationError(ValidationError::NoPhases {
            strategy: "cascade".into()
        })
    );
}

#[tokio::test]
async fn failed_phase_is_a_warning_outside_cascade() {
    // Only the first call fails, so only the first phase has no output.
    let h = harness_with(config(), ScriptedProvider::generator("writer").failing_first(1));

    let result = h
        .alembic
        .generate(GenerateRequest::new("Draft a migration plan"))
        .await
        .unwrap();

    assert_eq!(result.artifacts.len(), 2);
    let phase_failure = result
        .warnings
        .iter()
        .find(|w| w.variant.is_none())
        .expect("phase-level warning");
    assert_eq!(phase_failure.phase, Phase::prima_materia());
    assert!(phase_failure.reason.contains("writer"));
}

#[tokio::test]
async fn failed_phase_fails_a_cascade() {
    let h = harness_with(config(), ScriptedProvider::generator("writer").failing_first(1));
    let request = GenerateRequest::new("Draft a migration plan")
        .with_strategy(SelectionStrategy::Cascade);

    let err = h.alembic.generate(request).await.unwrap_err();

    assert!(matches!(err, AlembicError::ProviderUnavailable { .. }), "{err}");
    assert_eq!(h.writer.generate_calls(), 1);
}

#[tokio::test]
async fn every_phase_failing_is_a_generation_failure() {
    let h = harness_with(config(), ScriptedProvider::generator("writer").failing());

    let err = h
        .alembic
        .generate(GenerateRequest::new("anything"))
        .await
        .unwrap_err();

    match err {
        AlembicError::GenerationFailed { reasons } => assert_eq!(reasons.len(), 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn partial_variant_failure_keeps_the_phase() {
    let h = harness_with(config(), ScriptedProvider::generator("writer").failing_first(1));
    let request = GenerateRequest::new("Plan a release")
        .with_phases(vec![Phase::prima_materia()])
        .with_variants(3)
        .with_strategy(SelectionStrategy::All);

    let result = h.alembic.generate(request).await.unwrap();

    assert_eq!(result.artifacts.len(), 2);
    let failed: Vec<_> = result.warnings.iter().filter(|w| w.variant.is_some()).collect();
    assert_eq!(failed.len(), 1);
}

#[tokio::test]
async fn slow_phase_misses_its_deadline_without_failing_the_request() {
    let mut config = config();
    config.pipeline.phase_timeout_ms = 150;
    config.pipeline.phase_providers.insert(Phase::COAGULATIO.into(), "slow".into());
    config.pipeline.phase_providers.insert(Phase::PRIMA_MATERIA.into(), "writer".into());
    config.pipeline.phase_providers.insert(Phase::SOLUTIO.into(), "writer".into());

    let writer = Arc::new(ScriptedProvider::generator("writer"));
    let slow = Arc::new(ScriptedProvider::generator("slow").with_delay(Duration::from_secs(10)));
    let embedder = Arc::new(ScriptedProvider::embedder("embedder", DIMS));
    let mut registry = ProviderRegistry::new();
    registry.register(writer.clone()).unwrap();
    registry.register(slow.clone()).unwrap();
    registry.register(embedder).unwrap();
    let store = Arc::new(StorageEngine::open_in_memory(DIMS).unwrap());
    let alembic = Alembic::with_parts(config, registry, store).unwrap();

    let started = std::time::Instant::now();
    let result = alembic
        .generate(GenerateRequest::new("Write release notes"))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.artifacts.len(), 2);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.phase == Phase::coagulatio() && w.reason.contains("deadline")));
    assert_eq!(slow.generate_calls(), 1);
}

#[tokio::test]
async fn request_deadline_bounds_every_phase() {
    let writer = ScriptedProvider::generator("writer").with_delay(Duration::from_secs(10));
    let h = harness_with(config(), writer);

    let err = h
        .alembic
        .generate(GenerateRequest::new("x").with_timeout_ms(100))
        .await
        .unwrap_err();

    match err {
        AlembicError::GenerationFailed { reasons } => {
            assert_eq!(reasons.len(), 3);
            assert!(reasons.iter().all(|r| r.contains("deadline")));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn provider_pin_overrides_phase_config() {
    let mut config = config();
    config.pipeline.phase_providers.insert(Phase::SOLUTIO.into(), "writer".into());

    let writer = Arc::new(ScriptedProvider::generator("writer"));
    let alt = Arc::new(ScriptedProvider::generator("alt"));
    let mut registry = ProviderRegistry::new();
    registry.register(writer.clone()).unwrap();
    registry.register(alt.clone()).unwrap();
    registry.register(Arc::new(ScriptedProvider::embedder("embedder", DIMS))).unwrap();
    let store = Arc::new(StorageEngine::open_in_memory(DIMS).unwrap());
    let alembic = Alembic::with_parts(config, registry, store).unwrap();

    let result = alembic
        .generate(GenerateRequest::new("x").with_provider("alt"))
        .await
        .unwrap();

    assert_eq!(alt.generate_calls(), 3);
    assert_eq!(writer.generate_calls(), 0);
    assert!(result.artifacts.iter().all(|g| g.artifact.provider == "alt"));
}

#[tokio::test]
async fn phase_config_routes_unpinned_requests() {
    let mut config = config();
    config.pipeline.phase_providers.insert(Phase::SOLUTIO.into(), "alt".into());

    let writer = Arc::new(ScriptedProvider::generator("writer"));
    let alt = Arc::new(ScriptedProvider::generator("alt"));
    let mut registry = ProviderRegistry::new();
    registry.register(writer.clone()).unwrap();
    registry.register(alt.clone()).unwrap();
    registry.register(Arc::new(ScriptedProvider::embedder("embedder", DIMS))).unwrap();
    let store = Arc::new(StorageEngine::open_in_memory(DIMS).unwrap());
    let alembic = Alembic::with_parts(config, registry, store).unwrap();

    let result = alembic.generate(GenerateRequest::new("x")).await.unwrap();

    assert_eq!(alt.generate_calls(), 1);
    assert_eq!(writer.generate_calls(), 2);
    assert_eq!(result.artifacts[1].artifact.provider, "alt");
}

#[tokio::test]
async fn embeddings_record_substitution_for_generation_only_providers() {
    let h = harness();
    let result = h.alembic.generate(GenerateRequest::new("x")).await.unwrap();

    for generated in &result.artifacts {
        let info = generated.artifact.embedding_info.as_ref().expect("embedded");
        assert_eq!(info.provider, "embedder");
        assert_eq!(info.requested_provider, "writer");
        assert!(info.substituted);
        assert_eq!(info.dimensions, DIMS);
        assert_eq!(generated.artifact.embedding.as_ref().map(Vec::len), Some(DIMS));
    }
    assert!(h.embedder.embed_calls() >= 3);
}

#[tokio::test]
async fn usage_and_cost_are_recorded() {
    let h = harness_with(config(), ScriptedProvider::generator("writer").with_cost(2.0));
    let result = h.alembic.generate(GenerateRequest::new("x")).await.unwrap();

    for generated in &result.artifacts {
        let m = &generated.artifact.metadata;
        assert!(m.input_tokens > 0);
        assert!(m.output_tokens > 0);
        let expected = f64::from(m.total_tokens()) / 1000.0 * 2.0;
        assert!((m.cost - expected).abs() < 1e-9);
        assert_eq!(m.temperature, h.alembic.config().pipeline.default_temperature);
    }
}

#[tokio::test]
async fn storage_failure_returns_artifacts_flagged_not_durable() {
    let store = Arc::new(FaultyStore::failing_inserts());
    let h = harness_on(config(), ScriptedProvider::generator("writer"), store.clone());

    let result = h.alembic.generate(GenerateRequest::new("x")).await.unwrap();

    assert_eq!(result.artifacts.len(), 3);
    for generated in &result.artifacts {
        assert!(!generated.durable);
        assert!(generated.ranking.is_some());
        assert!(store.get_artifact(&generated.artifact.id).unwrap().is_none());
    }
    assert!(result
        .warnings
        .iter()
        .any(|w| w.reason.contains("not durably saved")));
}

#[tokio::test]
async fn judge_ranker_scores_through_its_provider() {
    let mut config = config();
    config.ranking.ranker = RankerKind::Judge;
    config.ranking.judge_provider = Some("judge".into());

    let writer = Arc::new(ScriptedProvider::generator("writer"));
    let judge = Arc::new(ScriptedProvider::generator("judge").with_reply(
        r#"{"overall_score": 8, "criteria_scores": {"clarity": 8}, "reasoning": "clear"}"#,
    ));
    let mut registry = ProviderRegistry::new();
    registry.register(writer.clone()).unwrap();
    registry.register(judge.clone()).unwrap();
    registry.register(Arc::new(ScriptedProvider::embedder("embedder", DIMS))).unwrap();
    let store = Arc::new(StorageEngine::open_in_memory(DIMS).unwrap());
    let alembic = Alembic::with_parts(config, registry, store).unwrap();

    let result = alembic.generate(GenerateRequest::new("x")).await.unwrap();

    assert_eq!(writer.generate_calls(), 3);
    assert_eq!(judge.generate_calls(), 3);
    for generated in &result.artifacts {
        let ranking = generated.ranking.as_ref().unwrap();
        assert!((ranking.aggregate - 0.8).abs() < 1e-9);
        assert!(ranking.factors.is_none());
        assert!(matches!(ranking.source, ScoreSource::Judge { .. }));
    }
}

#[tokio::test]
async fn generation_is_counted_in_metrics() {
    let h = harness();
    let result = h.alembic.generate(GenerateRequest::new("x")).await.unwrap();

    let metrics = h.alembic.metrics();
    assert_eq!(metrics.generation.requests, 1);
    assert_eq!(metrics.generation.failed_requests, 0);
    assert_eq!(metrics.generation.prompts_generated, 3);
    let tokens: u64 = result
        .artifacts
        .iter()
        .map(|g| u64::from(g.artifact.metadata.total_tokens()))
        .sum();
    assert_eq!(metrics.generation.total_tokens(), tokens);
    for phase in Phase::builtin() {
        assert_eq!(metrics.generation.phase_runs(phase.as_str()), 1);
    }
    assert_eq!(metrics.provider.requests["writer"], 3);
    assert_eq!(metrics.storage.artifacts_persisted, 3);
}

#[tokio::test]
async fn failed_requests_and_provider_errors_are_counted() {
    let h = harness_with(config(), ScriptedProvider::generator("writer").failing());
    assert!(h.alembic.generate(GenerateRequest::new("x")).await.is_err());

    let metrics = h.alembic.metrics();
    assert_eq!(metrics.generation.requests, 1);
    assert_eq!(metrics.generation.failed_requests, 1);
    assert_eq!(metrics.generation.prompts_generated, 0);
    assert_eq!(metrics.provider.errors["writer"], 3);
    assert!(metrics.provider.exhausted >= 3);
}
