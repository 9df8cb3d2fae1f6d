use alembic_core::traits::Neighbor;

use super::NEUTRAL;

/// Contextual relevance: mean similarity to recent related artifacts.
///
/// Negative similarities count as 0. No neighbors means no evidence.
pub fn calculate(neighbors: &[Neighbor]) -> f64 {
    if neighbors.is_empty() {
        return NEUTRAL;
    }
    let total: f64 = neighbors
        .iter()
        .map(|n| {
            if n.similarity.is_finite() {
                n.similarity.clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .sum();
    total / neighbors.len() as f64
}
