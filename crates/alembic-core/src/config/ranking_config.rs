use serde::{Deserialize, Serialize};

use super::defaults;

/// Which ranker scores candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankerKind {
    /// Deterministic multi-factor weighted sum.
    #[default]
    Weighted,
    /// Language-model judge.
    Judge,
}

/// Ranking engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub ranker: RankerKind,
    /// Provider asked for verdicts when `ranker = "judge"`.
    pub judge_provider: Option<String>,
    pub optimal_temperature: f64,
    pub ideal_min_tokens: u32,
    pub ideal_max_tokens: u32,
    /// Half-life of feedback influence, in days.
    pub decay_half_life_days: f64,
    /// Neighbors consulted for contextual relevance.
    pub relevance_neighbors: usize,
    /// How far back "recent related artifacts" reach.
    pub relevance_window_days: i64,
    pub weight_temperature: f64,
    pub weight_token_efficiency: f64,
    pub weight_relevance: f64,
    pub weight_historical: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            ranker: RankerKind::Weighted,
            judge_provider: None,
            optimal_temperature: defaults::DEFAULT_OPTIMAL_TEMPERATURE,
            ideal_min_tokens: defaults::DEFAULT_IDEAL_MIN_TOKENS,
            ideal_max_tokens: defaults::DEFAULT_IDEAL_MAX_TOKENS,
            decay_half_life_days: defaults::DEFAULT_DECAY_HALF_LIFE_DAYS,
            relevance_neighbors: defaults::DEFAULT_RELEVANCE_NEIGHBORS,
            relevance_window_days: defaults::DEFAULT_RELEVANCE_WINDOW_DAYS,
            weight_temperature: defaults::DEFAULT_WEIGHT_TEMPERATURE,
            weight_token_efficiency: defaults::DEFAULT_WEIGHT_TOKEN_EFFICIENCY,
            weight_relevance: defaults::DEFAULT_WEIGHT_RELEVANCE,
            weight_historical: defaults::DEFAULT_WEIGHT_HISTORICAL,
        }
    }
}
