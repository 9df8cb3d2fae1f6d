//! Iterative refinement: re-generate from the best version so far until the
//! score reaches the target or the iteration budget runs out. A provider
//! failure ends the loop early with the best version seen.

use tracing::{info, warn, Instrument};

use alembic_core::errors::{AlembicResult, ValidationError};
use alembic_core::models::{
    Artifact, GenerationRequest, Lineage, OptimizeRequest, OptimizeResult,
};
use alembic_observability::optimize_span;

use crate::orchestrator::{Draft, Orchestrator};

const REFINE_SYSTEM_PROMPT: &str = "You are an expert prompt engineer. You improve prompts \
so they serve their task better. Reply with the improved prompt text only.";

fn refine_prompt(content: &str, task: &str, score: f64) -> String {
    format!(
        "Improve the prompt below for its task. It currently scores {score:.2} out of 1.00.\n\n\
         Task: {task}\n\n\
         Prompt:\n\"\"\"\n{content}\n\"\"\"\n\n\
         Make it clearer, more specific, and better aimed at the task."
    )
}

impl Orchestrator {
    pub(crate) async fn optimize(
        &self,
        request: OptimizeRequest,
    ) -> AlembicResult<OptimizeResult> {
        if request.task_description.trim().is_empty() {
            return Err(ValidationError::EmptyInput.into());
        }
        if !(0.0..=1.0).contains(&request.target_score) {
            return Err(ValidationError::InvalidTargetScore {
                value: request.target_score,
            }
            .into());
        }
        let max_iterations = if request.max_iterations == 0 {
            self.pipeline.optimize_max_iterations
        } else {
            request.max_iterations
        };

        let span = optimize_span!(request.artifact_id, max_iterations);
        self.refine_loop(request, max_iterations).instrument(span).await
    }

    async fn refine_loop(
        &self,
        request: OptimizeRequest,
        max_iterations: u32,
    ) -> AlembicResult<OptimizeResult> {
        let original = self
            .store
            .get_artifact(&request.artifact_id)?
            .ok_or_else(|| ValidationError::UnknownArtifact {
                id: request.artifact_id.clone(),
            })?;
        let task = request.task_description.as_str();
        let original_score = self.rank(&original, Some(task)).await?.aggregate;

        let request_id = Artifact::new_id();
        let mut best = original;
        let mut best_score = original_score;
        let mut iterations = 0;
        let mut converged_at = (original_score >= request.target_score).then_some(0);
        let mut stopped_by = None;

        while converged_at.is_none() && iterations < max_iterations {
            iterations += 1;
            let generation = GenerationRequest {
                prompt: refine_prompt(&best.content, task, best_score),
                system_prompt: Some(REFINE_SYSTEM_PROMPT.to_string()),
                temperature: self.pipeline.default_temperature,
                max_tokens: self.pipeline.default_max_tokens,
                model: None,
            };
            let draft = Draft {
                phase: best.phase.clone(),
                lineage: Lineage {
                    request_id: request_id.clone(),
                    parent_id: Some(best.id.clone()),
                },
                tags: best.tags.clone(),
            };
            let candidate = match self
                .generate_artifact(request.provider.as_deref(), &generation, draft)
                .await
            {
                Ok(candidate) => candidate,
                Err(e) => {
                    warn!(iteration = iterations, error = %e, "refinement stopped, keeping best so far");
                    stopped_by = Some(e.to_string());
                    break;
                }
            };
            let output = self.settle(candidate, Some(task)).await;
            for warning in &output.warnings {
                warn!(iteration = iterations, warning = %warning, "refinement degraded");
            }

            let score = output
                .generated
                .ranking
                .as_ref()
                .map_or(0.0, |r| r.aggregate);
            info!(iteration = iterations, score, best_score, "refinement scored");
            if score > best_score {
                best = output.generated.artifact;
                best_score = score;
            }
            if score >= request.target_score {
                converged_at = Some(iterations);
            }
        }

        Ok(OptimizeResult {
            original_id: request.artifact_id,
            best,
            original_score,
            final_score: best_score,
            improvement: best_score - original_score,
            iterations,
            converged_at,
            stopped_by,
        })
    }
}
