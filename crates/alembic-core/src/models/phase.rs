use serde::{Deserialize, Serialize};

/// One stage of the transformation pipeline, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phase(String);

impl Phase {
    /// Ideation: turns the raw request into a first structured prompt.
    pub const PRIMA_MATERIA: &'static str = "prima-materia";
    /// Refinement: makes the prompt natural and specific.
    pub const SOLUTIO: &'static str = "solutio";
    /// Finalization: tightens the prompt for precision and token economy.
    pub const COAGULATIO: &'static str = "coagulatio";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn prima_materia() -> Self {
        Self::new(Self::PRIMA_MATERIA)
    }

    pub fn solutio() -> Self {
        Self::new(Self::SOLUTIO)
    }

    pub fn coagulatio() -> Self {
        Self::new(Self::COAGULATIO)
    }

    /// The built-in phases in their canonical order.
    pub fn builtin() -> Vec<Phase> {
        vec![Self::prima_materia(), Self::solutio(), Self::coagulatio()]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Phase {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
