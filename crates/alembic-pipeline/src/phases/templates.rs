use std::collections::BTreeMap;

use alembic_core::config::PipelineConfig;
use alembic_core::constants::{INPUT_PLACEHOLDER, PROMPT_PLACEHOLDER};
use alembic_core::errors::{AlembicError, AlembicResult, ValidationError};
use alembic_core::models::Phase;

use super::PhaseContext;

const SYSTEM_BASE: &str = "You are an expert prompt engineer. You write prompts that \
language models follow reliably. Reply with the prompt text only.";

const PRIMA_MATERIA_TEMPLATE: &str = "Turn the request below into a complete prompt. The prompt must:
- state the goal and the expected output
- give the model the background it needs
- name constraints and edge cases explicitly
- be specific enough to act on without follow-up questions

Request: {{INPUT}}";

const SOLUTIO_TEMPLATE: &str = "Rewrite the prompt below so it reads like a person wrote it. \
Keep every requirement, drop stiff or mechanical phrasing, and keep the structure easy to follow.

Prompt: {{PROMPT}}";

const COAGULATIO_TEMPLATE: &str = "Tighten the prompt below. Remove redundancy, make each \
instruction unambiguous, and use as few tokens as the meaning allows.

Prompt: {{PROMPT}}";

/// System prompt and user template for one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTemplate {
    pub phase: Phase,
    pub system_prompt: String,
    pub template: String,
}

impl PhaseTemplate {
    pub fn new(phase: Phase, system_prompt: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            phase,
            system_prompt: system_prompt.into(),
            template: template.into(),
        }
    }

    /// Fill the placeholders, then append persona and context hints.
    pub fn render(&self, context: &PhaseContext) -> String {
        let mut prompt = self
            .template
            .replace(INPUT_PLACEHOLDER, &context.original_input)
            .replace(PROMPT_PLACEHOLDER, &context.phase_input);

        if let Some(persona) = context.persona.as_deref().filter(|p| !p.trim().is_empty()) {
            prompt.push_str("\n\nWrite for this persona: ");
            prompt.push_str(persona);
        }
        if !context.hints.is_empty() {
            prompt.push_str("\n\nAdditional context:");
            for hint in &context.hints {
                prompt.push_str("\n- ");
                prompt.push_str(hint);
            }
        }
        prompt
    }
}

/// Every phase the pipeline knows how to run, keyed by name.
#[derive(Debug, Clone)]
pub struct PhaseCatalog {
    templates: BTreeMap<String, PhaseTemplate>,
}

impl Default for PhaseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PhaseCatalog {
    /// The three built-in phases.
    pub fn builtin() -> Self {
        let builtin = [
            PhaseTemplate::new(
                Phase::prima_materia(),
                format!("{SYSTEM_BASE} You expand rough ideas into complete prompts."),
                PRIMA_MATERIA_TEMPLATE,
            ),
            PhaseTemplate::new(
                Phase::solutio(),
                format!("{SYSTEM_BASE} You make prompts sound natural without losing requirements."),
                SOLUTIO_TEMPLATE,
            ),
            PhaseTemplate::new(
                Phase::coagulatio(),
                format!("{SYSTEM_BASE} You optimize prompts for clarity and token efficiency."),
                COAGULATIO_TEMPLATE,
            ),
        ];
        Self {
            templates: builtin
                .into_iter()
                .map(|t| (t.phase.as_str().to_string(), t))
                .collect(),
        }
    }

    /// Built-ins plus configured custom phases. A custom phase with a
    /// built-in name replaces the built-in.
    pub fn from_config(config: &PipelineConfig) -> AlembicResult<Self> {
        let mut catalog = Self::builtin();
        for custom in &config.custom_phases {
            let name = custom.name.trim();
            if name.is_empty() {
                return Err(AlembicError::Config {
                    reason: "custom phase needs a name".to_string(),
                });
            }
            if !custom.template.contains(INPUT_PLACEHOLDER)
                && !custom.template.contains(PROMPT_PLACEHOLDER)
            {
                return Err(AlembicError::Config {
                    reason: format!(
                        "custom phase '{name}' template uses neither {INPUT_PLACEHOLDER} nor {PROMPT_PLACEHOLDER}"
                    ),
                });
            }
            catalog.insert(PhaseTemplate::new(
                Phase::new(name),
                custom.system_prompt.clone(),
                custom.template.clone(),
            ));
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, template: PhaseTemplate) {
        self.templates
            .insert(template.phase.as_str().to_string(), template);
    }

    pub fn get(&self, phase: &Phase) -> Result<&PhaseTemplate, ValidationError> {
        self.templates
            .get(phase.as_str())
            .ok_or_else(|| ValidationError::UnknownPhase {
                name: phase.as_str().to_string(),
            })
    }

    /// Fail on the first phase with no template.
    pub fn check_all(&self, phases: &[Phase]) -> Result<(), ValidationError> {
        phases.iter().try_for_each(|p| self.get(p).map(|_| ()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}
