//! Phase definitions: the built-in stages, config-declared custom stages, and
//! the typed context handed from one stage to the next.

mod context;
mod templates;

pub use context::PhaseContext;
pub use templates::{PhaseCatalog, PhaseTemplate};
