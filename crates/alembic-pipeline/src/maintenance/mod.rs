//! Background maintenance tasks.

pub mod reembed;

pub use reembed::{ReembedReport, ReembedWorker};
