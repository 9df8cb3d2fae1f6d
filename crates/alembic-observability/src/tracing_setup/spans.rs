//! Span definitions per operation: generate, phase, variant, search, rank,
//! train, optimize, embed.

/// Create a generate span.
#[macro_export]
macro_rules! generate_span {
    ($request_id:expr, $strategy:expr) => {
        tracing::info_span!("alembic.generate", request_id = %$request_id, strategy = %$strategy)
    };
}

/// Create a phase span.
#[macro_export]
macro_rules! phase_span {
    ($phase:expr, $variants:expr) => {
        tracing::info_span!("alembic.phase", phase = %$phase, variants = $variants)
    };
}

/// Create a variant span.
#[macro_export]
macro_rules! variant_span {
    ($phase:expr, $index:expr) => {
        tracing::debug_span!("alembic.variant", phase = %$phase, index = $index)
    };
}

#[macro_export]
macro_rules! search_span {
    ($top_k:expr, $hybrid:expr) => {
        tracing::info_span!("alembic.search", top_k = $top_k, hybrid = $hybrid)
    };
}

#[macro_export]
macro_rules! rank_span {
    ($artifact_id:expr) => {
        tracing::debug_span!("alembic.rank", artifact_id = %$artifact_id)
    };
}

#[macro_export]
macro_rules! train_span {
    ($cursor:expr) => {
        tracing::info_span!("alembic.train", cursor = $cursor)
    };
}

#[macro_export]
macro_rules! optimize_span {
    ($artifact_id:expr, $max_iterations:expr) => {
        tracing::info_span!(
            "alembic.optimize",
            artifact_id = %$artifact_id,
            max_iterations = $max_iterations
        )
    };
}

/// Create an embedding span.
#[macro_export]
macro_rules! embed_span {
    ($requested:expr, $dimensions:expr) => {
        tracing::debug_span!("alembic.embed", requested = %$requested, dimensions = $dimensions)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const GENERATE: &str = "alembic.generate";
    pub const PHASE: &str = "alembic.phase";
    pub const VARIANT: &str = "alembic.variant";
    pub const SEARCH: &str = "alembic.search";
    pub const RANK: &str = "alembic.rank";
    pub const TRAIN: &str = "alembic.train";
    pub const OPTIMIZE: &str = "alembic.optimize";
    pub const EMBED: &str = "alembic.embed";
}
