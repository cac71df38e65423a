//! Property tests for aggregation, gating and whole-pipeline determinism.

use proptest::prelude::*;
use truthscore_core::{
    ComponentName, ComponentScore, ComponentValues, ComponentWeights, Decision, DecisionGate,
    ScoreAggregator, ScoringConfig, TruthScorer,
};

fn weights_strategy() -> impl Strategy<Value = ComponentWeights> {
    (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0)
        .prop_filter("weights must not all vanish", |(a, b, c, d)| a + b + c + d > 0.01)
        .prop_map(|(a, b, c, d)| {
            let sum = a + b + c + d;
            ComponentWeights {
                evidence: a / sum,
                consistency: b / sum,
                coverage: c / sum,
                language: d / sum,
            }
        })
}

fn config_strategy() -> impl Strategy<Value = ScoringConfig> {
    (weights_strategy(), 0.0f64..=1.0, 0.0f64..=1.0, 0.5f64..20.0).prop_map(
        |(weights, a, b, steepness)| {
            let (accept, qualified) = if a >= b { (a, b) } else { (b, a) };
            ScoringConfig::new(weights, accept, qualified, steepness).unwrap()
        },
    )
}

fn values_strategy() -> impl Strategy<Value = ComponentValues> {
    (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(|(e, s, c, l)| {
        ComponentValues {
            evidence: e,
            consistency: s,
            coverage: c,
            language: l,
        }
    })
}

fn raise(values: ComponentValues, name: ComponentName, delta: f64) -> ComponentValues {
    let mut raised = values;
    let slot = match name {
        ComponentName::Evidence => &mut raised.evidence,
        ComponentName::Consistency => &mut raised.consistency,
        ComponentName::Coverage => &mut raised.coverage,
        ComponentName::Language => &mut raised.language,
    };
    *slot = (*slot + delta).min(1.0);
    raised
}

proptest! {
    #[test]
    fn aggregate_is_monotone_in_each_component(
        config in config_strategy(),
        values in values_strategy(),
        index in 0usize..4,
        delta in 0.0f64..1.0,
    ) {
        let aggregator = ScoreAggregator::new();
        let name = ComponentName::ALL[index];
        let before = aggregator.aggregate_values(&values, &config);
        let after = aggregator.aggregate_values(&raise(values, name, delta), &config);
        prop_assert!(after >= before, "{} dropped from {} to {}", name, before, after);
    }

    #[test]
    fn aggregate_stays_in_unit_interval(
        config in config_strategy(),
        values in values_strategy(),
    ) {
        let score = ScoreAggregator::new().aggregate_values(&values, &config);
        prop_assert!(!score.is_nan());
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn aggregate_accepts_components_in_any_order(
        config in config_strategy(),
        values in values_strategy(),
        rotation in 0usize..4,
    ) {
        let mut scores = vec![
            ComponentScore::new(ComponentName::Evidence, values.evidence),
            ComponentScore::new(ComponentName::Consistency, values.consistency),
            ComponentScore::new(ComponentName::Coverage, values.coverage),
            ComponentScore::new(ComponentName::Language, values.language),
        ];
        scores.rotate_left(rotation);

        let aggregator = ScoreAggregator::new();
        let from_scores = aggregator.aggregate(&scores, &config).unwrap();
        let from_values = aggregator.aggregate_values(&values, &config);
        prop_assert_eq!(from_scores.to_bits(), from_values.to_bits());
    }

    #[test]
    fn gate_partitions_unit_interval(config in config_strategy(), score in 0.0f64..=1.0) {
        let decision = DecisionGate::new().decide(score, &config);
        let expected = if score >= config.accept_threshold() {
            Decision::Accept
        } else if score >= config.qualified_threshold() {
            Decision::Qualified
        } else {
            Decision::Refuse
        };
        prop_assert_eq!(decision, expected);
    }

    #[test]
    fn gate_is_monotone_in_score(config in config_strategy(), a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let gate = DecisionGate::new();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let rank = |d: Decision| match d {
            Decision::Refuse => 0,
            Decision::Qualified => 1,
            Decision::Accept => 2,
        };
        prop_assert!(rank(gate.decide(low, &config)) <= rank(gate.decide(high, &config)));
    }

    #[test]
    fn evaluation_is_deterministic(question in "[a-zA-Z ?]{0,60}", answer in "[a-zA-Z .,!?]{0,200}") {
        let scorer = TruthScorer::new();
        let first = scorer.evaluate(&question, &answer).unwrap();
        let second = scorer.evaluate(&question, &answer).unwrap();
        prop_assert_eq!(first.score.to_bits(), second.score.to_bits());
        prop_assert_eq!(&first, &second);
        for component in &first.components {
            prop_assert!((0.0..=1.0).contains(&component.value));
        }
    }
}
