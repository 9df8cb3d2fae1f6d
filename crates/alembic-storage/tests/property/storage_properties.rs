//! Property tests for the embedding codec and the search threshold.

use alembic_core::models::{SearchFilter, SearchOptions};
use alembic_core::traits::IArtifactStore;
use alembic_storage::codec::{cosine_similarity, decode, encode};
use alembic_storage::StorageEngine;
use proptest::prelude::*;
use test_fixtures::artifact;

const DIMS: usize = 6;

fn vector(dims: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-10.0f32..10.0, dims)
}

proptest! {
    #[test]
    fn codec_preserves_bits(v in prop::collection::vec(any::<f32>().prop_filter("finite", |x| x.is_finite()), 0..64)) {
        let decoded = decode("p", &encode(&v)).unwrap();
        prop_assert_eq!(decoded.len(), v.len());
        for (a, b) in decoded.iter().zip(&v) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn cosine_is_bounded_and_symmetric(a in vector(DIMS), b in vector(DIMS)) {
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        prop_assert!((-1.0..=1.0).contains(&ab));
        prop_assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn truncated_blobs_never_decode(v in vector(DIMS), cut in 1usize..8) {
        let bytes = encode(&v);
        let short = &bytes[..bytes.len() - cut];
        prop_assert!(decode("p", short).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn search_never_returns_below_threshold(
        vectors in prop::collection::vec(vector(DIMS), 1..12),
        query in vector(DIMS),
        min_similarity in -1.0f64..1.0,
        top_k in 1usize..8,
    ) {
        let store = StorageEngine::open_in_memory(DIMS).unwrap();
        for (i, v) in vectors.iter().enumerate() {
            store
                .insert_artifact(&artifact(&format!("p{i:02}"), "prop").embedding(v.clone()).build())
                .unwrap();
        }
        let options = SearchOptions { top_k, min_similarity, lexical_weight: 0.0 };
        let outcome = store.search_vector(&query, &SearchFilter::default(), &options).unwrap();

        prop_assert!(outcome.hits.len() <= top_k);
        prop_assert!(outcome.mismatched.is_empty());
        for hit in &outcome.hits {
            prop_assert!(hit.similarity >= min_similarity);
        }
        for pair in outcome.hits.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
