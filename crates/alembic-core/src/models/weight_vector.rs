use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Factor, FactorScores};

/// Versioned weights combining factors into an aggregate score.
///
/// Values are never mutated in place: a new version is built with
/// [`WeightVector::next`] and published as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub version: u64,
    pub temperature: f64,
    pub token_efficiency: f64,
    pub relevance: f64,
    pub historical: f64,
    pub created_at: DateTime<Utc>,
}

impl WeightVector {
    pub fn initial(
        temperature: f64,
        token_efficiency: f64,
        relevance: f64,
        historical: f64,
    ) -> Self {
        Self {
            version: 1,
            temperature,
            token_efficiency,
            relevance,
            historical,
            created_at: Utc::now(),
        }
    }

    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Temperature => self.temperature,
            Factor::TokenEfficiency => self.token_efficiency,
            Factor::Relevance => self.relevance,
            Factor::Historical => self.historical,
        }
    }

    /// Build the successor version from per-factor weights in `Factor::ALL` order.
    pub fn next(&self, weights: [f64; 4]) -> Self {
        Self {
            version: self.version + 1,
            temperature: weights[0],
            token_efficiency: weights[1],
            relevance: weights[2],
            historical: weights[3],
            created_at: Utc::now(),
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        Factor::ALL.map(|f| self.get(f))
    }

    /// Weights scaled to sum to 1. Falls back to uniform when every weight is zero.
    pub fn normalized(&self) -> [f64; 4] {
        let raw = self.as_array();
        let total: f64 = raw.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return [0.25; 4];
        }
        raw.map(|w| w / total)
    }

    /// Weighted sum of the factor scores, in 0..1 when every factor is.
    pub fn aggregate(&self, scores: &FactorScores) -> f64 {
        let weights = self.normalized();
        Factor::ALL
            .iter()
            .zip(weights.iter())
            .map(|(factor, w)| w * scores.get(*factor))
            .sum()
    }
}
