//! SQL for each stored record family. Every function takes a bare connection;
//! locking and connection routing belong to the engine.

pub mod artifact_crud;
pub mod feedback_ops;
pub mod filter;
pub mod lexical_search;
pub mod ranking_ops;
pub mod vector_search;
pub mod weight_ops;

use chrono::{DateTime, SecondsFormat, Utc};

use alembic_core::errors::AlembicResult;

use crate::to_storage_err;

/// Fixed-width UTC timestamps, so text comparison orders them correctly.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: &str) -> AlembicResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("bad timestamp '{raw}': {e}")))
}
