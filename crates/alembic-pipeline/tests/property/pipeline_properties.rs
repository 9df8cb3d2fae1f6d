//! Property tests for phase fingerprints and prompt rendering.

use std::collections::BTreeSet;

use alembic_core::models::{Phase, SelectionStrategy};
use alembic_pipeline::{fingerprint, PhaseCatalog, PhaseContext, PhasePlan};
use proptest::prelude::*;

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.]{1,60}"
}

fn context(input: String, phase_input: String, temperature: f64) -> PhaseContext {
    PhaseContext {
        version: 0,
        original_input: input,
        phase_input,
        persona: None,
        hints: Vec::new(),
        temperature,
        max_tokens: 512,
        parent_id: None,
    }
}

fn plan(request_id: &str) -> PhasePlan {
    PhasePlan {
        request_id: request_id.to_string(),
        phase: Phase::solutio(),
        provider: None,
        variants: 2,
        strategy: SelectionStrategy::BestPerPhase,
        tags: BTreeSet::new(),
    }
}

proptest! {
    #[test]
    fn fingerprint_ignores_the_request_id(
        input in text(),
        phase_input in text(),
        temperature in 0.0f64..=2.0,
    ) {
        let ctx = context(input, phase_input, temperature);
        prop_assert_eq!(fingerprint(&plan("req-a"), &ctx), fingerprint(&plan("req-b"), &ctx));
    }

    #[test]
    fn fingerprint_tracks_phase_input(
        input in text(),
        a in text(),
        b in text(),
    ) {
        prop_assume!(a != b);
        let p = plan("req");
        prop_assert_ne!(
            fingerprint(&p, &context(input.clone(), a, 0.7)),
            fingerprint(&p, &context(input, b, 0.7))
        );
    }

    #[test]
    fn fingerprint_tracks_temperature(
        input in text(),
        t1 in 0.0f64..=2.0,
        t2 in 0.0f64..=2.0,
    ) {
        prop_assume!(t1.to_bits() != t2.to_bits());
        let p = plan("req");
        prop_assert_ne!(
            fingerprint(&p, &context(input.clone(), input.clone(), t1)),
            fingerprint(&p, &context(input.clone(), input, t2))
        );
    }

    #[test]
    fn rendered_prompts_carry_their_input(
        input in text(),
        phase_input in text(),
        persona in text(),
    ) {
        let catalog = PhaseCatalog::builtin();
        let mut ctx = context(input.clone(), phase_input.clone(), 0.7);
        ctx.persona = Some(persona.clone());

        let first = catalog.get(&Phase::prima_materia()).unwrap().render(&ctx);
        prop_assert!(first.contains(&input));

        let second = catalog.get(&Phase::solutio()).unwrap().render(&ctx);
        prop_assert!(second.contains(&phase_input));
        if !persona.trim().is_empty() {
            prop_assert!(second.contains(&persona));
        }
    }
}

#[test]
fn list_boundaries_are_part_of_the_fingerprint() {
    let mut two_tags = plan("req");
    two_tags.tags = ["a", "b"].iter().map(|t| t.to_string()).collect();
    let mut trailing = context("c".into(), "d".into(), 0.7);
    trailing.persona = Some("e".into());

    let mut one_tag = plan("req");
    one_tag.tags = ["a"].iter().map(|t| t.to_string()).collect();
    let mut shifted = context("b".into(), "c".into(), 0.7);
    shifted.persona = Some("d".into());
    shifted.hints = vec!["e".into()];

    assert_ne!(fingerprint(&two_tags, &trailing), fingerprint(&one_tag, &shifted));
}

proptest! {
    #[test]
    fn moving_a_value_between_fields_changes_the_fingerprint(
        tags in prop::collection::btree_set(text(), 0..3),
        hints in prop::collection::vec(text(), 0..3),
        input in text(),
        extra in text(),
    ) {
        let mut p = plan("req");
        p.tags = tags.clone();
        let mut ctx = context(input.clone(), input.clone(), 0.7);
        ctx.hints = hints.clone();

        let mut moved_plan = p.clone();
        moved_plan.tags.insert(extra.clone());
        prop_assume!(moved_plan.tags.len() > tags.len());
        let mut moved_ctx = ctx.clone();
        moved_ctx.hints.insert(0, extra);

        prop_assert_ne!(fingerprint(&moved_plan, &ctx), fingerprint(&p, &moved_ctx));
    }
}
