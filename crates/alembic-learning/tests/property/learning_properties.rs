//! Property tests for the bounded learning step.

use std::sync::Arc;

use alembic_core::config::{LearningConfig, RankingConfig};
use alembic_core::models::{Factor, FactorScores};
use alembic_learning::LearningEngine;
use alembic_ranking::WeightStore;
use alembic_storage::StorageEngine;
use proptest::prelude::*;

fn scores() -> impl Strategy<Value = (FactorScores, f64)> {
    (prop::array::uniform4(0.0f64..=1.0), 0.0f64..=1.0).prop_map(|(f, outcome)| {
        (
            FactorScores {
                temperature: f[0],
                token_efficiency: f[1],
                relevance: f[2],
                historical: f[3],
            },
            outcome,
        )
    })
}

proptest! {
    #[test]
    fn step_is_bounded_and_clamped(
        samples in prop::collection::vec(scores(), 0..40),
        learning_rate in 0.0f64..5.0,
        max_step in 0.0f64..0.2,
    ) {
        let config = LearningConfig { learning_rate, max_step, ..LearningConfig::default() };
        let weights = Arc::new(WeightStore::from_config(&RankingConfig::default()));
        let engine = LearningEngine::new(
            Arc::new(StorageEngine::open_in_memory(4).unwrap()),
            Arc::clone(&weights),
            config.clone(),
        );
        let current = weights.snapshot();
        let next = engine.step(&current, &samples);

        for (factor, w) in Factor::ALL.iter().zip(next) {
            prop_assert!(w.is_finite());
            prop_assert!(w >= config.min_weight && w <= config.max_weight);
            prop_assert!((w - current.get(*factor)).abs() <= max_step + 1e-12);
        }
    }
}
