//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use tracing_subscriber::EnvFilter;

use alembic_core::config::defaults::{DEFAULT_LOG_LEVEL, LOG_ENV_VAR};

/// Install a JSON subscriber filtered by `ALEMBIC_LOG` (default `info`).
///
/// Returns `false` when a global subscriber was already installed; the
/// existing one stays in place.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init()
        .is_ok()
}

/// Install a subscriber with an explicit filter string (for tests or embedding).
pub fn init_tracing_with_filter(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .json()
        .try_init()
        .is_ok()
}
