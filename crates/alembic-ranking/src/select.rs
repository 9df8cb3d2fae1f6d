use std::cmp::Ordering;

use alembic_core::models::{Artifact, RankingRecord};

/// Best first: higher aggregate, then fewer total tokens, then earlier
/// creation, then id so the order is total.
pub fn compare_ranked(a: (&Artifact, &RankingRecord), b: (&Artifact, &RankingRecord)) -> Ordering {
    let tokens = |x: &Artifact| {
        u64::from(x.metadata.input_tokens) + u64::from(x.metadata.output_tokens)
    };
    b.1.aggregate
        .total_cmp(&a.1.aggregate)
        .then_with(|| tokens(a.0).cmp(&tokens(b.0)))
        .then_with(|| a.0.created_at.cmp(&b.0.created_at))
        .then_with(|| a.0.id.cmp(&b.0.id))
}

/// Index of the winner in `ranked`, or `None` when empty.
pub fn best_of(ranked: &[(Artifact, RankingRecord)]) -> Option<usize> {
    ranked
        .iter()
        .enumerate()
        .min_by(|(_, x), (_, y)| compare_ranked((&x.0, &x.1), (&y.0, &y.1)))
        .map(|(i, _)| i)
}
