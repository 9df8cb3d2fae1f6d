//! # alembic-observability
//!
//! Subscriber installation filtered by `ALEMBIC_LOG`, span definitions for
//! every engine operation, structured event helpers, and in-process metrics.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{MetricsCollector, SharedMetrics};
pub use tracing_setup::{init_tracing, init_tracing_with_filter};
