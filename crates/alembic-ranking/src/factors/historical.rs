use chrono::{DateTime, Utc};

use alembic_core::models::FeedbackEvent;
use alembic_core::traits::Neighbor;

use super::NEUTRAL;
use crate::decay;

/// Historical performance: decay-weighted mean outcome of feedback on the
/// artifact itself and on its similar neighbors.
///
/// Own feedback carries similarity 1.0; neighbor feedback is weighted by the
/// neighbor's similarity. Events on unrelated artifacts or with an
/// out-of-range value are ignored.
pub fn calculate(
    artifact_id: &str,
    neighbors: &[Neighbor],
    history: &[FeedbackEvent],
    as_of: DateTime<Utc>,
    half_life_days: f64,
) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for event in history {
        let Some(outcome) = event.outcome() else {
            continue;
        };
        let similarity = if event.artifact_id == artifact_id {
            1.0
        } else {
            match neighbors.iter().find(|n| n.artifact_id == event.artifact_id) {
                Some(n) if n.similarity > 0.0 => n.similarity.min(1.0),
                _ => continue,
            }
        };
        let w = similarity * decay::weight(event.age_days(as_of), half_life_days);
        weighted += w * outcome;
        total += w;
    }
    if total > 0.0 {
        (weighted / total).clamp(0.0, 1.0)
    } else {
        NEUTRAL
    }
}
