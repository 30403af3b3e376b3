use ctpower::power::calculator::PowerCalculator;
use ctpower::sample_size::solver::SampleSizeSolver;
use ctpower::{EffectSize, EffectSizeType, SampleSize, TestExtras, TestType};
use proptest::prelude::*;

// Series truncation in the noncentral sums can wobble the last digits
const SLACK: f64 = 1e-9;

fn power(test_type: TestType, n: usize, effect: EffectSize, extras: &TestExtras) -> f64 {
    PowerCalculator::new()
        .power(test_type, &SampleSize::PerGroup(n), effect, 0.05, extras)
        .unwrap_or_else(|e| panic!("{test_type} n = {n}: {e}"))
}

fn any_test() -> impl Strategy<Value = TestType> {
    (0..TestType::ALL.len()).prop_map(|i| TestType::ALL[i])
}

fn t_test() -> impl Strategy<Value = TestType> {
    prop_oneof![
        Just(TestType::OneSampleT),
        Just(TestType::TwoSampleT),
        Just(TestType::PairedT),
    ]
}

/// An in-range effect of the test's default kind, growing with `m` in
/// [0, 1]. Fisher's test reads its effect from the proportions instead.
fn design_for(test_type: TestType, m: f64) -> (EffectSize, TestExtras) {
    let effect = match test_type.default_effect_type() {
        // Kept below 1 so one extra subject per group never moves power far
        EffectSizeType::CohensF => EffectSize::cohens_f(m),
        EffectSizeType::HazardRatio => EffectSize::hazard_ratio(1.0 - 0.6 * m),
        EffectSizeType::PearsonR => EffectSize::pearson_r(0.8 * m),
        EffectSizeType::RSquared => EffectSize::r_squared(0.5 * m),
        EffectSizeType::ProbabilityOfSuperiority => {
            EffectSize::probability_of_superiority(0.5 + 0.4 * m)
        }
        kind => EffectSize::new(1.5 * m, kind),
    };
    let extras = match test_type {
        TestType::FisherExact => TestExtras::default().with_proportions(0.5 + 0.4 * m, 0.5),
        _ => TestExtras::default(),
    };
    (effect, extras)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn power_monotone_in_n(test_type in any_test(), m in 0.02f64..1.0, n in 5usize..200, step in 1usize..50) {
        let (effect, extras) = design_for(test_type, m);
        let smaller = power(test_type, n, effect, &extras);
        let larger = power(test_type, n + step, effect, &extras);
        prop_assert!(
            larger + SLACK >= smaller,
            "{test_type}: {smaller} at {n} vs {larger} at {}", n + step
        );
    }

    #[test]
    fn power_monotone_in_effect(test_type in any_test(), m in 0.0f64..0.9, bump in 0.01f64..0.1, n in 5usize..200) {
        let (weak, weak_extras) = design_for(test_type, m);
        let (strong, strong_extras) = design_for(test_type, m + bump);
        let smaller = power(test_type, n, weak, &weak_extras);
        let larger = power(test_type, n, strong, &strong_extras);
        prop_assert!(larger + SLACK >= smaller, "{test_type}: {smaller} vs {larger}");
    }

    #[test]
    fn power_symmetric_in_sign_of_d(test_type in t_test(), d in 0.0f64..1.5, n in 3usize..200) {
        let extras = TestExtras::default();
        let pos = power(test_type, n, EffectSize::cohens_d(d), &extras);
        let neg = power(test_type, n, EffectSize::cohens_d(-d), &extras);
        prop_assert!((pos - neg).abs() < 1e-6);
    }

    #[test]
    fn power_is_a_probability(test_type in any_test(), m in 0.0f64..1.0, n in 5usize..500) {
        let (effect, extras) = design_for(test_type, m);
        let p = power(test_type, n, effect, &extras);
        prop_assert!((0.0..=1.0).contains(&p), "{test_type}: {p}");
    }

    #[test]
    fn solve_then_power_round_trip(test_type in any_test(), m in 0.15f64..0.4, target in 0.6f64..0.9) {
        let calc = PowerCalculator::new();
        let (effect, extras) = design_for(test_type, m);
        let res = SampleSizeSolver::default()
            .solve(&calc, test_type, target, effect, 0.05, None, None, &extras)
            .unwrap_or_else(|e| panic!("{test_type}: {e}"));
        prop_assert!(res.convergence_achieved, "{test_type}");
        prop_assert!(res.required_sample_size >= 1);

        let achieved = power(test_type, res.required_sample_size, effect, &extras);
        prop_assert!(achieved + SLACK >= target);
        prop_assert!((achieved - target).abs() <= 0.05, "{test_type}: {achieved} vs {target}");
        if res.required_sample_size > test_type.min_group_size(&extras) {
            let below = power(test_type, res.required_sample_size - 1, effect, &extras);
            prop_assert!(below < target);
        }
    }
}
