use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scoring dimension of the deterministic ranker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Temperature,
    TokenEfficiency,
    Relevance,
    Historical,
}

impl Factor {
    /// Every factor, in the fixed order used for summation.
    pub const ALL: [Factor; 4] = [
        Factor::Temperature,
        Factor::TokenEfficiency,
        Factor::Relevance,
        Factor::Historical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::TokenEfficiency => "token_efficiency",
            Self::Relevance => "relevance",
            Self::Historical => "historical",
        }
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized 0..1 value per factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub temperature: f64,
    pub token_efficiency: f64,
    pub relevance: f64,
    pub historical: f64,
}

impl FactorScores {
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Temperature => self.temperature,
            Factor::TokenEfficiency => self.token_efficiency,
            Factor::Relevance => self.relevance,
            Factor::Historical => self.historical,
        }
    }
}

/// Which ranker produced a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreSource {
    /// Deterministic weighted sum under a specific weight version.
    Weighted { weight_version: u64 },
    /// Language-model verdict.
    Judge { provider: String, reasoning: String },
}

/// Per-artifact score. Recomputable, but always tied to the inputs it was computed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRecord {
    pub artifact_id: String,
    /// Factor breakdown; absent for judge verdicts.
    pub factors: Option<FactorScores>,
    pub aggregate: f64,
    pub source: ScoreSource,
    pub computed_at: DateTime<Utc>,
}

impl RankingRecord {
    pub fn weight_version(&self) -> Option<u64> {
        match self.source {
            ScoreSource::Weighted { weight_version } => Some(weight_version),
            ScoreSource::Judge { .. } => None,
        }
    }
}
