use alembic_core::models::{FactorScores, WeightVector};
use proptest::prelude::*;

fn unit() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

proptest! {
    #[test]
    fn normalized_weights_sum_to_one(
        a in 0.0f64..10.0, b in 0.0f64..10.0, c in 0.0f64..10.0, d in 0.0f64..10.0
    ) {
        let w = WeightVector::initial(a, b, c, d);
        let sum: f64 = w.normalized().iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9, "sum = {}", sum);
    }

    #[test]
    fn aggregate_stays_in_unit_range(
        a in 0.0f64..10.0, b in 0.0f64..10.0, c in 0.0f64..10.0, d in 0.0f64..10.0,
        t in unit(), e in unit(), r in unit(), h in unit()
    ) {
        let w = WeightVector::initial(a, b, c, d);
        let scores = FactorScores { temperature: t, token_efficiency: e, relevance: r, historical: h };
        let agg = w.aggregate(&scores);
        prop_assert!((-1e-12..=1.0 + 1e-12).contains(&agg), "aggregate = {}", agg);
    }

    #[test]
    fn aggregate_is_deterministic(
        t in unit(), e in unit(), r in unit(), h in unit()
    ) {
        let w = WeightVector::initial(0.2, 0.2, 0.3, 0.3);
        let scores = FactorScores { temperature: t, token_efficiency: e, relevance: r, historical: h };
        prop_assert_eq!(w.aggregate(&scores).to_bits(), w.aggregate(&scores).to_bits());
    }
}
