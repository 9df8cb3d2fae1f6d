use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_USER_RATING, MIN_USER_RATING};

/// Kind of outcome signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// Explicit 1-5 rating.
    UserRating,
    /// Count of times the artifact was reused.
    Reuse,
    /// 0..1 score from an evaluator.
    EvaluatorScore,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRating => "user_rating",
            Self::Reuse => "reuse",
            Self::EvaluatorScore => "evaluator_score",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user_rating" => Some(Self::UserRating),
            "reuse" => Some(Self::Reuse),
            "evaluator_score" => Some(Self::EvaluatorScore),
            _ => None,
        }
    }
}

/// Outcome signal tied to an artifact. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    /// Storage row id; 0 before persistence.
    pub id: i64,
    pub artifact_id: String,
    pub kind: FeedbackKind,
    pub value: f64,
    pub created_at: DateTime<Utc>,
}

impl FeedbackEvent {
    pub fn new(artifact_id: impl Into<String>, kind: FeedbackKind, value: f64) -> Self {
        Self {
            id: 0,
            artifact_id: artifact_id.into(),
            kind,
            value,
            created_at: Utc::now(),
        }
    }

    /// Outcome normalized to 0..1, or `None` when the raw value is out of range.
    pub fn outcome(&self) -> Option<f64> {
        if !self.value.is_finite() {
            return None;
        }
        match self.kind {
            FeedbackKind::UserRating => {
                if (MIN_USER_RATING..=MAX_USER_RATING).contains(&self.value) {
                    Some((self.value - MIN_USER_RATING) / (MAX_USER_RATING - MIN_USER_RATING))
                } else {
                    None
                }
            }
            FeedbackKind::Reuse => {
                if self.value >= 0.0 {
                    Some(self.value / (self.value + 1.0))
                } else {
                    None
                }
            }
            FeedbackKind::EvaluatorScore => {
                if (0.0..=1.0).contains(&self.value) {
                    Some(self.value)
                } else {
                    None
                }
            }
        }
    }

    /// Age in fractional days relative to `as_of`. Never negative.
    pub fn age_days(&self, as_of: DateTime<Utc>) -> f64 {
        let secs = (as_of - self.created_at).num_milliseconds() as f64 / 1000.0;
        (secs / 86_400.0).max(0.0)
    }
}
