use alembic_core::config::PipelineConfig;
use alembic_core::models::{Artifact, GenerateRequest};

/// Inputs for one phase execution, passed by value.
///
/// Crossing a phase boundary keeps `original_input`, `persona`, `hints`,
/// `temperature` and `max_tokens`; `phase_input` and `parent_id` reset and
/// `version` increments.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseContext {
    pub version: u32,
    pub original_input: String,
    /// Text substituted for `{{PROMPT}}`.
    pub phase_input: String,
    pub persona: Option<String>,
    pub hints: Vec<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Artifact this phase builds on; set only when chaining.
    pub parent_id: Option<String>,
}

impl PhaseContext {
    pub fn from_request(request: &GenerateRequest, config: &PipelineConfig) -> Self {
        Self {
            version: 0,
            original_input: request.input.clone(),
            phase_input: request.input.clone(),
            persona: request.persona.clone(),
            hints: request.context_hints.clone(),
            temperature: request.temperature.unwrap_or(config.default_temperature),
            max_tokens: request.max_tokens.unwrap_or(config.default_max_tokens),
            parent_id: None,
        }
    }

    /// Context for the next phase when phases run independently.
    pub fn propagate_to_next(&self) -> Self {
        Self {
            version: self.version.saturating_add(1),
            original_input: self.original_input.clone(),
            phase_input: self.original_input.clone(),
            persona: self.persona.clone(),
            hints: self.hints.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            parent_id: None,
        }
    }

    /// Context for the next phase in a cascade: the winner is the sole input.
    pub fn chained_from(&self, winner: &Artifact) -> Self {
        let mut next = self.propagate_to_next();
        next.phase_input = winner.content.clone();
        next.parent_id = Some(winner.id.clone());
        next
    }
}
