// Single source of truth for all default values.

// --- Providers ---
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PROVIDER_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
pub const DEFAULT_MAX_CONTEXT_TOKENS: usize = 8_192;
pub const DEFAULT_RELATIVE_LATENCY: f64 = 1.0;

// --- Pipeline ---
pub const DEFAULT_WORKER_POOL_SIZE: usize = 4;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000; // 2 minutes
pub const DEFAULT_PHASE_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_VARIANT_COUNT: i32 = 1;
pub const DEFAULT_MAX_VARIANT_COUNT: i32 = 16;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2_048;

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "alembic.db";
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;
pub const DEFAULT_EMBEDDING_MODEL: &str = "alembic-hashed-v1";
pub const DEFAULT_EMBEDDING_CACHE_SIZE: u64 = 10_000;
pub const DEFAULT_EMBEDDING_CACHE_TTL_SECS: u64 = 3_600;
pub const DEFAULT_REEMBED_BATCH_SIZE: usize = 10;
pub const DEFAULT_REEMBED_INTERVAL_SECS: u64 = 120;

// --- Search ---
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.3;
pub const DEFAULT_LEXICAL_WEIGHT: f64 = 0.3;
pub const DEFAULT_TOP_K: usize = 10;

// --- Ranking ---
pub const DEFAULT_OPTIMAL_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_IDEAL_MIN_TOKENS: u32 = 25;
pub const DEFAULT_IDEAL_MAX_TOKENS: u32 = 500;
pub const DEFAULT_DECAY_HALF_LIFE_DAYS: f64 = 14.0;
pub const DEFAULT_RELEVANCE_NEIGHBORS: usize = 5;
pub const DEFAULT_RELEVANCE_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_NEUTRAL_FACTOR: f64 = 0.5;
pub const DEFAULT_WEIGHT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_WEIGHT_TOKEN_EFFICIENCY: f64 = 0.2;
pub const DEFAULT_WEIGHT_RELEVANCE: f64 = 0.3;
pub const DEFAULT_WEIGHT_HISTORICAL: f64 = 0.3;

// --- Learning ---
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_MAX_STEP: f64 = 0.05;
pub const DEFAULT_MIN_BATCH_SIZE: usize = 5;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 5_000;
pub const DEFAULT_MIN_WEIGHT: f64 = 0.01;
pub const DEFAULT_MAX_WEIGHT: f64 = 1.0;
pub const DEFAULT_TRAINING_INTERVAL_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_POSITIVE_THRESHOLD: f64 = 0.7;

// --- Optimization ---
pub const DEFAULT_OPTIMIZE_MAX_ITERATIONS: u32 = 5;
pub const DEFAULT_OPTIMIZE_TARGET_SCORE: f64 = 0.8;

// --- History enhancement ---
pub const DEFAULT_HISTORY_CANDIDATES: usize = 5;
pub const DEFAULT_HISTORY_EXAMPLES: usize = 3;
/// Characters of each example copied into a hint.
pub const HISTORY_EXAMPLE_MAX_CHARS: usize = 400;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOG_ENV_VAR: &str = "ALEMBIC_LOG";
