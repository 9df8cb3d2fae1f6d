//! Deterministic multi-factor ranker.
//!
//! `aggregate = Σ normalized_weight(f) × factor(f)` over the four factors in
//! fixed order. Scoring is a pure function of the artifact, the context, and
//! one weight snapshot, so the same inputs always give the same record.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use alembic_core::config::RankingConfig;
use alembic_core::errors::AlembicResult;
use alembic_core::models::{Artifact, FactorScores, RankingRecord, ScoreSource, WeightVector};
use alembic_core::traits::{IRanker, RankingContext};

use crate::factors;
use crate::weights::WeightStore;

pub struct RankingEngine {
    weights: Arc<WeightStore>,
    config: RankingConfig,
}

impl RankingEngine {
    pub fn new(weights: Arc<WeightStore>, config: RankingConfig) -> Self {
        Self { weights, config }
    }

    pub fn weights(&self) -> &Arc<WeightStore> {
        &self.weights
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Per-factor scores; independent of weights.
    pub fn factors(&self, artifact: &Artifact, context: &RankingContext) -> FactorScores {
        let neighbors: Vec<_> = context
            .neighbors
            .iter()
            .filter(|n| n.artifact_id != artifact.id)
            .cloned()
            .collect();
        FactorScores {
            temperature: factors::temperature::calculate(
                artifact.metadata.temperature,
                self.config.optimal_temperature,
            ),
            token_efficiency: factors::token_efficiency::calculate(
                artifact.metadata.output_tokens,
                self.config.ideal_min_tokens,
                self.config.ideal_max_tokens,
            ),
            relevance: factors::relevance::calculate(&neighbors),
            historical: factors::historical::calculate(
                &artifact.id,
                &neighbors,
                &context.history,
                context.as_of,
                self.config.decay_half_life_days,
            ),
        }
    }

    /// Score under an explicit weight vector.
    pub fn score_with(
        &self,
        artifact: &Artifact,
        context: &RankingContext,
        weights: &WeightVector,
    ) -> RankingRecord {
        let scores = self.factors(artifact, context);
        let aggregate = weights.aggregate(&scores);
        trace!(
            artifact_id = %artifact.id,
            weight_version = weights.version,
            aggregate,
            "artifact scored"
        );
        RankingRecord {
            artifact_id: artifact.id.clone(),
            factors: Some(scores),
            aggregate,
            source: ScoreSource::Weighted {
                weight_version: weights.version,
            },
            computed_at: context.as_of,
        }
    }

    /// Score under the active weights. One snapshot is taken per call.
    pub fn score_sync(&self, artifact: &Artifact, context: &RankingContext) -> RankingRecord {
        let weights = self.weights.snapshot();
        self.score_with(artifact, context, &weights)
    }
}

#[async_trait]
impl IRanker for RankingEngine {
    fn name(&self) -> &str {
        "weighted"
    }

    async fn score(
        &self,
        artifact: &Artifact,
        context: &RankingContext,
    ) -> AlembicResult<RankingRecord> {
        Ok(self.score_sync(artifact, context))
    }
}
