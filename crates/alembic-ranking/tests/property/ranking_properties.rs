//! Property tests for the weighted ranker.

use std::sync::Arc;

use alembic_core::config::RankingConfig;
use alembic_core::models::{FeedbackEvent, FeedbackKind};
use alembic_core::traits::{Neighbor, RankingContext};
use alembic_ranking::{decay, RankingEngine, WeightStore};
use chrono::{Duration, Utc};
use proptest::prelude::*;
use test_fixtures::artifact;

fn engine_with(weights: [f64; 4]) -> RankingEngine {
    let config = RankingConfig::default();
    let store = WeightStore::from_config(&config);
    let next = store.snapshot().next(weights);
    store.publish(next).unwrap();
    RankingEngine::new(Arc::new(store), config)
}

proptest! {
    #[test]
    fn aggregate_stays_in_unit_range(
        weights in prop::array::uniform4(0.0f64..1.0),
        temperature in 0.0f64..2.0,
        output in 0u32..5_000,
        sims in prop::collection::vec(-1.0f64..1.0, 0..6),
        ratings in prop::collection::vec((1.0f64..=5.0, 0i64..90), 0..6),
    ) {
        let engine = engine_with(weights);
        let now = Utc::now();
        let a = artifact("a", "x").temperature(temperature).tokens(10, output).build();
        let mut ctx = RankingContext::empty(now);
        ctx.neighbors = sims
            .iter()
            .enumerate()
            .map(|(i, s)| Neighbor { artifact_id: format!("n{i}"), similarity: *s })
            .collect();
        ctx.history = ratings
            .iter()
            .enumerate()
            .map(|(i, (stars, age))| {
                let target = if i % 2 == 0 { "a".to_string() } else { format!("n{i}") };
                let mut e = FeedbackEvent::new(target, FeedbackKind::UserRating, *stars);
                e.created_at = now - Duration::days(*age);
                e
            })
            .collect();

        let first = engine.score_sync(&a, &ctx);
        prop_assert!((0.0..=1.0 + 1e-12).contains(&first.aggregate));
        let f = first.factors.unwrap();
        for v in [f.temperature, f.token_efficiency, f.relevance, f.historical] {
            prop_assert!((0.0..=1.0).contains(&v));
        }
        let second = engine.score_sync(&a, &ctx);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn decay_is_monotone_in_age(a in 0.0f64..365.0, b in 0.0f64..365.0, half_life in 0.5f64..60.0) {
        let (young, old) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(decay::weight(young, half_life) >= decay::weight(old, half_life));
    }
}
