use ctpower::{
    BayesianMethod, DesignType, EffectSize, EngineConfig, FlatRecord, InterimDecision,
    SampleSize, SpendingFcn, StatisticalPowerEngine, TestExtras, TestType,
};
use itertools::Itertools;
use serde_json::Value;

fn engine() -> StatisticalPowerEngine {
    StatisticalPowerEngine::default()
}

#[test]
fn two_sample_t_power_and_sample_size() {
    let engine = engine();
    let power = engine.calculate_power(
        TestType::TwoSampleT,
        &SampleSize::TwoGroups(30, 30),
        EffectSize::cohens_d(0.5),
        Some(0.05),
        &TestExtras::default(),
    );
    assert!(power.power >= 0.45 && power.power <= 0.55);

    let size = engine.calculate_sample_size(
        TestType::TwoSampleT,
        0.8,
        EffectSize::cohens_d(0.5),
        Some(0.05),
        None,
        None,
        &TestExtras::default(),
    );
    assert!(size.convergence_achieved);
    // required_sample_size is per group
    assert!((60..=64).contains(&size.required_sample_size));
    assert_eq!(size.sample_size_per_group, vec![size.required_sample_size; 2]);
    assert_eq!(size.sample_size_total, 2 * size.required_sample_size);
    assert!(size.power_curve_points.len() >= 5);
    assert_eq!(engine.history().len(), 2);
}

#[test]
fn zero_effect_does_not_converge() {
    let res = engine().calculate_sample_size(
        TestType::TwoSampleT,
        0.8,
        EffectSize::cohens_d(0.0),
        None,
        Some((2, 2_000)),
        None,
        &TestExtras::default(),
    );
    assert!(!res.convergence_achieved);
    assert!(!res.recommendations.is_empty());
    // Zero effect also draws the small-effect warning
    assert!(res.warnings.iter().any(|w| w.contains("small-effect threshold")));
}

#[test]
fn obrien_fleming_boundaries_decrease() {
    let res = engine().group_sequential_boundaries(
        Some(0.05),
        &[0.25, 0.5, 0.75, 1.0],
        &SpendingFcn::OBrienFleming,
    );
    assert!(res.warnings.is_empty());
    assert!(res.efficacy_boundaries.iter().tuple_windows().all(|(a, b)| a > b));
    assert!(*res.efficacy_boundaries.last().unwrap() > 1.96);
    assert!((res.cumulative_alpha_spent.last().unwrap() - 0.05).abs() < 1e-3);
    assert!((res.total_alpha_spent - 0.05).abs() < 1e-3);
    for (lo, hi) in res.futility_boundaries.iter().zip(&res.efficacy_boundaries) {
        assert_eq!(*lo, -hi);
    }
}

#[test]
fn pocock_boundaries_are_nearly_flat() {
    let res = engine().group_sequential_boundaries(
        Some(0.05),
        &[1. / 3., 2. / 3., 1.0],
        &SpendingFcn::Pocock,
    );
    let (min, max) = res
        .efficacy_boundaries
        .iter()
        .minmax()
        .into_option()
        .unwrap();
    assert!(max - min < 0.05);
    assert!((res.total_alpha_spent - 0.05).abs() < 1e-3);
}

#[test]
fn group_sequential_design_inflates_fixed_size() {
    let res = engine().design_adaptive_study(
        DesignType::GroupSequential,
        TestType::TwoSampleT,
        EffectSize::cohens_d(0.5),
        Some(0.05),
        0.8,
        &[0.5, 1.0],
        &SpendingFcn::Pocock,
        &TestExtras::default(),
    );
    assert!(res.type_i_error_control);
    assert!(res.initial_sample_size <= res.maximum_sample_size);
    assert!(res.maximum_sample_size > res.fixed_sample_size);
    assert!(res.inflation_factor > 1.0);
    assert!(res.expected_sample_size < res.maximum_sample_size as f64);
}

#[test]
fn bad_fractions_degrade_to_warnings() {
    let res = engine().design_adaptive_study(
        DesignType::GroupSequential,
        TestType::TwoSampleT,
        EffectSize::cohens_d(0.5),
        None,
        0.8,
        &[0.6, 0.4, 1.0],
        &SpendingFcn::OBrienFleming,
        &TestExtras::default(),
    );
    assert!(!res.type_i_error_control);
    assert_eq!(res.maximum_sample_size, 0);
    assert_eq!(res.warnings.len(), 1);
}

#[test]
fn conditional_power_increases_with_interim_effect() {
    let engine = engine();
    let cp = |d| {
        engine.calculate_conditional_power(
            TestType::TwoSampleT,
            EffectSize::cohens_d(d),
            50,
            100,
            None,
            &TestExtras::default(),
        )
    };
    let weak = cp(0.1);
    let moderate = cp(0.3);
    let strong = cp(0.7);
    assert!(weak.conditional_power < moderate.conditional_power);
    assert!(moderate.conditional_power < strong.conditional_power);
    assert_eq!(weak.decision, InterimDecision::ConsiderFutilityStop);
    assert_eq!(strong.decision, InterimDecision::StopForEfficacy);
}

#[test]
fn proportion_conditional_power_tracks_interim_effect() {
    let engine = engine();
    let planned = TestExtras::default().with_proportions(0.6, 0.4);
    let cp = |h| {
        engine.calculate_conditional_power(
            TestType::TwoSampleProportion,
            EffectSize::cohens_h(h),
            50,
            100,
            None,
            &planned,
        )
    };
    let null = cp(0.0);
    let moderate = cp(0.3);
    let strong = cp(0.8);
    assert!(null.warnings.is_empty());
    assert_eq!(null.decision, InterimDecision::ConsiderFutilityStop);
    assert!(null.conditional_power < moderate.conditional_power);
    assert!(moderate.conditional_power < strong.conditional_power);
    assert_eq!(strong.decision, InterimDecision::StopForEfficacy);
}

#[test]
fn reestimation_clamps_to_range() {
    let engine = engine();
    let up = engine.reestimate_sample_size(10.0, 1.0, 100, 0.8);
    assert_eq!(up.reestimated_sample_size, 300);
    assert!(up.clamped);
    let down = engine.reestimate_sample_size(0.1, 1.0, 100, 0.8);
    assert_eq!(down.reestimated_sample_size, 50);
    assert!(down.clamped);
    let within = engine.reestimate_sample_size(1.2, 1.0, 100, 0.8);
    assert_eq!(within.reestimated_sample_size, 120);
    assert!(!within.clamped);
}

#[test]
fn bayesian_power_grows_with_n() {
    let engine = engine();
    for method in [
        BayesianMethod::ConjugateNormal,
        BayesianMethod::Jeffreys,
        BayesianMethod::Simulation,
    ] {
        let small = engine.calculate_bayesian_power(20, 0.3, 0.0, 1.0, 0.975, method);
        let large = engine.calculate_bayesian_power(100, 0.3, 0.0, 1.0, 0.975, method);
        assert!(large.posterior_power > small.posterior_power, "{method}");
        assert!(large.credible_interval.0 <= large.credible_interval.1);
    }
}

#[test]
fn posterior_probability_from_data() {
    let res = engine().posterior_probability(&[0.5, 1.2, -0.3, 0.8, 1.1, 0.4, 0.9, 0.2], 0.0, 0.0, 1.0);
    assert!((res.posterior_power - 0.999570).abs() < 1e-5);
    assert_eq!(res.sample_size, 8);

    let short = engine().posterior_probability(&[0.5], 0.0, 0.0, 1.0);
    assert_eq!(short.posterior_power, 0.0);
    assert_eq!(short.warnings.len(), 1);
}

#[test]
fn flat_records_use_snake_case_tags() {
    let engine = engine();
    let power = engine
        .calculate_power(
            TestType::LogRankSurvival,
            &SampleSize::PerGroup(100),
            EffectSize::hazard_ratio(0.7),
            None,
            &TestExtras::default(),
        )
        .to_flat_map();
    assert_eq!(power["test_type"], Value::from("log_rank_survival"));
    assert_eq!(power["effect_size_type"], Value::from("hazard_ratio"));

    let bayes = engine
        .calculate_bayesian_power(50, 0.3, 0.0, 1.0, 0.975, BayesianMethod::Jeffreys)
        .to_flat_map();
    assert_eq!(bayes["method"], Value::from("jeffreys"));
    assert!(bayes.contains_key("prior_specification.mean"));
}

#[test]
fn config_from_json_drives_the_engine() {
    let config = EngineConfig::from_json_str(
        r#"{"default_alpha": 0.01, "advice": {"small_sample_threshold": 10}}"#,
    )
    .expect("failed to parse configuration");
    let engine = StatisticalPowerEngine::new(config);
    let res = engine.calculate_power(
        TestType::OneSampleT,
        &SampleSize::PerGroup(20),
        EffectSize::cohens_d(0.5),
        None,
        &TestExtras::default(),
    );
    assert_eq!(res.alpha, 0.01);
    assert!(res.warnings.is_empty());
}
