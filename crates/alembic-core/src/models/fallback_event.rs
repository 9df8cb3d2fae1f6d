use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Capability;

/// Recorded whenever a fallback chain moves past a failing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackEvent {
    pub capability: Capability,
    pub failed_provider: String,
    pub reason: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}
