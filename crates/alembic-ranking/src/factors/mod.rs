//! Factor functions. Each maps its inputs to 0.0 – 1.0.

pub mod historical;
pub mod relevance;
pub mod temperature;
pub mod token_efficiency;

/// Score used when a factor has no evidence either way.
pub const NEUTRAL: f64 = 0.5;
