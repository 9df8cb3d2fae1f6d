/// Alembic engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Placeholder in phase templates replaced by the original request text.
pub const INPUT_PLACEHOLDER: &str = "{{INPUT}}";

/// Placeholder in phase templates replaced by the phase's input prompt.
pub const PROMPT_PLACEHOLDER: &str = "{{PROMPT}}";

/// Size in bytes of the dimension header that prefixes every embedding blob.
pub const EMBEDDING_HEADER_BYTES: usize = 4;

/// Highest accepted explicit user rating.
pub const MAX_USER_RATING: f64 = 5.0;

/// Lowest accepted explicit user rating.
pub const MIN_USER_RATING: f64 = 1.0;

/// Upper bound for judge verdicts before normalization to 0..1.
pub const JUDGE_SCALE: f64 = 10.0;
