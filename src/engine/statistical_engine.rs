//----------------------------------------
// Statistical power engine
//----------------------------------------
use crate::adaptive::calculator::AdaptiveDesignCalculator;
use crate::adaptive::types::{
    AdaptiveAnalysisResult, ConditionalPowerResult, DesignType, GroupSequentialBoundaries,
    InterimDecision, ReestimationResult,
};
use crate::bayesian::calculator::BayesianPowerCalculator;
use crate::bayesian::types::{BayesianMethod, BayesianPowerResult, PriorSpecification};
use crate::config::EngineConfig;
use crate::engine::advice;
use crate::engine::types::{CalculationRecord, PowerAnalysisResult};
use crate::error::CtpowerErr;
use crate::power::calculator::PowerCalculator;
use crate::power::types::{EffectSize, SampleSize, TestExtras, TestType, total_sample_size};
use crate::sample_size::solver::SampleSizeSolver;
use crate::sample_size::types::SampleSizeCalculation;
use crate::spending::types::SpendingFcn;
use parking_lot::Mutex;
use tracing::warn;

/// Front door to every calculator. Operations never fail: a calculation
/// that cannot be carried out yields a minimal result whose warnings say
/// why. Engines are independent of one another and safe to share across
/// threads.
#[derive(Debug)]
pub struct StatisticalPowerEngine {
    config: EngineConfig,
    power: PowerCalculator,
    solver: SampleSizeSolver,
    adaptive: AdaptiveDesignCalculator,
    bayesian: BayesianPowerCalculator,
    history: Mutex<Vec<CalculationRecord>>,
}

impl Default for StatisticalPowerEngine {
    fn default() -> Self {
        StatisticalPowerEngine::new(EngineConfig::default())
    }
}

impl StatisticalPowerEngine {
    /// An invalid configuration is replaced by the defaults; the rejection
    /// is logged and kept in the history. Use [`Self::try_new`] to get the
    /// error instead.
    pub fn new(config: EngineConfig) -> Self {
        match config.validate() {
            Ok(()) => StatisticalPowerEngine::build(config),
            Err(e) => {
                warn!(error = %e, "invalid configuration; falling back to defaults");
                let engine = StatisticalPowerEngine::build(EngineConfig::default());
                engine.record(
                    "configure",
                    false,
                    format!("{e}; using the default configuration"),
                );
                engine
            }
        }
    }

    /// Validates the configuration before building the engine
    pub fn try_new(config: EngineConfig) -> Result<Self, CtpowerErr> {
        config.validate()?;
        Ok(StatisticalPowerEngine::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        StatisticalPowerEngine {
            power: PowerCalculator::new(),
            solver: SampleSizeSolver::new(config.solver.clone()),
            adaptive: AdaptiveDesignCalculator::new(
                config.sequential.clone(),
                config.reestimation.clone(),
                config.solver.clone(),
            ),
            bayesian: BayesianPowerCalculator::new(config.bayesian.clone()),
            history: Mutex::new(vec![]),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The power calculator shared by every operation
    pub fn power_calculator(&self) -> &PowerCalculator {
        &self.power
    }

    pub fn history(&self) -> Vec<CalculationRecord> {
        self.history.lock().clone()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
        self.power.clear_history();
    }

    fn record(&self, operation: &'static str, success: bool, summary: String) {
        self.history.lock().push(CalculationRecord {
            operation,
            success,
            summary,
        });
    }

    fn degrade(&self, operation: &'static str, e: &CtpowerErr) -> Vec<String> {
        warn!(operation, error = %e, "calculation failed; returning a minimal result");
        self.record(operation, false, e.to_string());
        vec![format!("{operation} failed: {e}")]
    }

    fn alpha_or_default(&self, alpha: Option<f64>) -> f64 {
        alpha.unwrap_or(self.config.default_alpha)
    }

    //----------------------------------------
    // Power
    pub fn calculate_power(
        &self,
        test_type: TestType,
        sample_size: &SampleSize,
        effect_size: EffectSize,
        alpha: Option<f64>,
        extras: &TestExtras,
    ) -> PowerAnalysisResult {
        const OPERATION: &str = "calculate_power";
        let alpha = self.alpha_or_default(alpha);
        let sample_size_per_group =
            sample_size.group_sizes(test_type.n_groups(extras), extras.allocation_ratio());
        let sample_size_total = total_sample_size(&sample_size_per_group);

        let mut result = PowerAnalysisResult {
            test_type,
            power: 0.0,
            alpha,
            effect_size: effect_size.value,
            effect_size_type: effect_size.kind,
            sample_size_total,
            sample_size_per_group,
            warnings: vec![],
            recommendations: vec![],
        };

        match self
            .power
            .power(test_type, sample_size, effect_size, alpha, extras)
        {
            Ok(power) => {
                result.power = power;
                let advice_config = &self.config.advice;
                result
                    .warnings
                    .extend(advice::small_sample(sample_size_total, advice_config));
                result
                    .warnings
                    .extend(advice::small_effect(test_type, effect_size, extras));
                result
                    .recommendations
                    .extend(advice::power_level(power, advice_config));
                self.record(
                    OPERATION,
                    true,
                    format!("{test_type} n = {sample_size_total}: power {power:.4}"),
                );
            }
            Err(e) => result.warnings = self.degrade(OPERATION, &e),
        }
        result
    }

    //----------------------------------------
    // Sample size
    #[allow(clippy::too_many_arguments)]
    pub fn calculate_sample_size(
        &self,
        test_type: TestType,
        target_power: f64,
        effect_size: EffectSize,
        alpha: Option<f64>,
        bounds: Option<(usize, usize)>,
        allocation_ratio: Option<f64>,
        extras: &TestExtras,
    ) -> SampleSizeCalculation {
        const OPERATION: &str = "calculate_sample_size";
        let alpha = self.alpha_or_default(alpha);
        match self.solver.solve(
            &self.power,
            test_type,
            target_power,
            effect_size,
            alpha,
            bounds,
            allocation_ratio,
            extras,
        ) {
            Ok(mut res) => {
                res.warnings
                    .extend(advice::small_sample(res.sample_size_total, &self.config.advice));
                res.warnings
                    .extend(advice::small_effect(test_type, effect_size, extras));
                self.record(
                    OPERATION,
                    res.convergence_achieved,
                    format!(
                        "{test_type}: n = {} per group for power {target_power} (achieved {:.4})",
                        res.required_sample_size, res.power_achieved
                    ),
                );
                res
            }
            Err(e) => SampleSizeCalculation {
                test_type,
                required_sample_size: 1,
                power_achieved: 0.0,
                target_power,
                alpha,
                effect_size: effect_size.value,
                effect_size_type: effect_size.kind,
                sample_size_per_group: vec![],
                sample_size_total: 0,
                total_groups: 0,
                allocation_ratio: allocation_ratio.unwrap_or_else(|| extras.allocation_ratio()),
                convergence_achieved: false,
                iterations: 0,
                power_curve_points: vec![],
                warnings: self.degrade(OPERATION, &e),
                recommendations: vec![],
            },
        }
    }

    //----------------------------------------
    // Adaptive designs
    #[allow(clippy::too_many_arguments)]
    pub fn design_adaptive_study(
        &self,
        design_type: DesignType,
        test_type: TestType,
        effect_size: EffectSize,
        alpha: Option<f64>,
        target_power: f64,
        information_fractions: &[f64],
        spending_fcn: &SpendingFcn,
        extras: &TestExtras,
    ) -> AdaptiveAnalysisResult {
        const OPERATION: &str = "design_adaptive_study";
        let alpha = self.alpha_or_default(alpha);
        match self.adaptive.design_study(
            &self.power,
            design_type,
            test_type,
            effect_size,
            alpha,
            target_power,
            information_fractions,
            spending_fcn,
            extras,
        ) {
            Ok(mut res) => {
                res.warnings
                    .extend(advice::small_effect(test_type, effect_size, extras));
                self.record(
                    OPERATION,
                    res.type_i_error_control,
                    format!(
                        "{design_type} {test_type}: n from {} to {} per group ({spending_fcn})",
                        res.initial_sample_size, res.maximum_sample_size
                    ),
                );
                res
            }
            Err(e) => AdaptiveAnalysisResult {
                design_type,
                test_type,
                initial_sample_size: 0,
                maximum_sample_size: 0,
                fixed_sample_size: 0,
                inflation_factor: 1.0,
                interim_analyses: information_fractions.to_vec(),
                efficacy_boundaries: vec![],
                futility_boundaries: vec![],
                alpha_spending_function: spending_fcn.to_string(),
                type_i_error_control: false,
                cumulative_alpha: vec![],
                expected_sample_size: 0.0,
                stopping_probabilities: vec![],
                warnings: self.degrade(OPERATION, &e),
                recommendations: vec![],
            },
        }
    }

    pub fn group_sequential_boundaries(
        &self,
        alpha: Option<f64>,
        information_fractions: &[f64],
        spending_fcn: &SpendingFcn,
    ) -> GroupSequentialBoundaries {
        const OPERATION: &str = "group_sequential_boundaries";
        let alpha = self.alpha_or_default(alpha);
        match self
            .adaptive
            .group_sequential_boundaries(alpha, information_fractions, spending_fcn)
        {
            Ok(res) => {
                self.record(
                    OPERATION,
                    res.warnings.is_empty(),
                    format!(
                        "{spending_fcn} with {} looks: total alpha {:.5}",
                        information_fractions.len(),
                        res.total_alpha_spent
                    ),
                );
                res
            }
            Err(e) => GroupSequentialBoundaries {
                information_fractions: information_fractions.to_vec(),
                efficacy_boundaries: vec![],
                futility_boundaries: vec![],
                cumulative_alpha_spent: vec![],
                incremental_alpha: vec![],
                total_alpha_spent: 0.0,
                spending_function: spending_fcn.to_string(),
                warnings: self.degrade(OPERATION, &e),
            },
        }
    }

    pub fn calculate_conditional_power(
        &self,
        test_type: TestType,
        interim_effect: EffectSize,
        interim_n: usize,
        final_n: usize,
        alpha: Option<f64>,
        extras: &TestExtras,
    ) -> ConditionalPowerResult {
        const OPERATION: &str = "calculate_conditional_power";
        let alpha = self.alpha_or_default(alpha);
        match self.adaptive.conditional_power(
            &self.power,
            test_type,
            interim_effect,
            interim_n,
            final_n,
            alpha,
            extras,
        ) {
            Ok(res) => {
                self.record(
                    OPERATION,
                    true,
                    format!(
                        "{test_type} at {interim_n}/{final_n}: conditional power {:.4}, {}",
                        res.conditional_power, res.decision
                    ),
                );
                res
            }
            Err(e) => ConditionalPowerResult {
                test_type,
                conditional_power: 0.0,
                information_fraction: if final_n > 0 {
                    interim_n as f64 / final_n as f64
                } else {
                    0.0
                },
                interim_z: 0.0,
                critical_value: 0.0,
                efficacy_boundary: 0.0,
                decision: InterimDecision::Continue,
                warnings: self.degrade(OPERATION, &e),
                recommendations: vec![],
            },
        }
    }

    pub fn reestimate_sample_size(
        &self,
        interim_variance: f64,
        planned_variance: f64,
        original_n: usize,
        target_power: f64,
    ) -> ReestimationResult {
        const OPERATION: &str = "reestimate_sample_size";
        match self.adaptive.reestimate_sample_size(
            interim_variance,
            planned_variance,
            original_n,
            target_power,
        ) {
            Ok(res) => {
                self.record(
                    OPERATION,
                    true,
                    format!(
                        "n {original_n} -> {} (variance ratio {:.3})",
                        res.reestimated_sample_size, res.variance_ratio
                    ),
                );
                res
            }
            Err(e) => ReestimationResult {
                original_sample_size: original_n,
                reestimated_sample_size: original_n,
                variance_ratio: 1.0,
                multiplier: 1.0,
                clamped: false,
                target_power,
                warnings: self.degrade(OPERATION, &e),
                recommendations: vec![],
            },
        }
    }

    //----------------------------------------
    // Bayesian
    pub fn calculate_bayesian_power(
        &self,
        n: usize,
        effect_size: f64,
        prior_mean: f64,
        prior_variance: f64,
        decision_threshold: f64,
        method: BayesianMethod,
    ) -> BayesianPowerResult {
        const OPERATION: &str = "calculate_bayesian_power";
        match self.bayesian.bayesian_power(
            n,
            effect_size,
            prior_mean,
            prior_variance,
            decision_threshold,
            method,
        ) {
            Ok(mut res) => {
                res.warnings
                    .extend(advice::small_sample(n, &self.config.advice));
                self.record(
                    OPERATION,
                    true,
                    format!(
                        "{method} n = {n}: posterior power {:.4}, assurance {:.4}",
                        res.posterior_power, res.probability_of_success
                    ),
                );
                res
            }
            Err(e) => BayesianPowerResult {
                posterior_power: 0.0,
                credible_interval: (0.0, 0.0),
                probability_of_success: 0.0,
                posterior_mean: prior_mean,
                posterior_sd: 0.0,
                prior_specification: PriorSpecification::normal(prior_mean, prior_variance),
                method,
                sample_size: n,
                decision_threshold: Some(decision_threshold),
                warnings: self.degrade(OPERATION, &e),
            },
        }
    }

    pub fn posterior_probability(
        &self,
        observed_data: &[f64],
        null_value: f64,
        prior_mean: f64,
        prior_variance: f64,
    ) -> BayesianPowerResult {
        const OPERATION: &str = "posterior_probability";
        match self
            .bayesian
            .posterior_probability(observed_data, null_value, prior_mean, prior_variance)
        {
            Ok(res) => {
                self.record(
                    OPERATION,
                    true,
                    format!(
                        "P(theta > {null_value} | {} observations) = {:.4}",
                        res.sample_size, res.posterior_power
                    ),
                );
                res
            }
            Err(e) => BayesianPowerResult {
                posterior_power: 0.0,
                credible_interval: (0.0, 0.0),
                probability_of_success: 0.0,
                posterior_mean: prior_mean,
                posterior_sd: 0.0,
                prior_specification: PriorSpecification::normal(prior_mean, prior_variance),
                method: BayesianMethod::ConjugateNormal,
                sample_size: observed_data.len(),
                decision_threshold: None,
                warnings: self.degrade(OPERATION, &e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::flat::FlatRecord;

    #[test]
    fn two_sample_t_30_per_group() {
        let engine = StatisticalPowerEngine::default();
        let res = engine.calculate_power(
            TestType::TwoSampleT,
            &SampleSize::PerGroup(30),
            EffectSize::cohens_d(0.5),
            Some(0.05),
            &TestExtras::default(),
        );
        assert!(res.power > 0.45 && res.power < 0.55);
        assert_eq!(res.sample_size_total, 60);
        // Power below 0.8
        assert_eq!(res.recommendations.len(), 1);
        assert!(res.warnings.is_empty());
    }

    #[test]
    fn small_sample_and_effect_warnings() {
        let engine = StatisticalPowerEngine::default();
        let res = engine.calculate_power(
            TestType::OneSampleT,
            &SampleSize::PerGroup(12),
            EffectSize::cohens_d(0.1),
            None,
            &TestExtras::default(),
        );
        assert_eq!(res.alpha, 0.05);
        assert_eq!(res.warnings.len(), 2);
        assert!(res.warnings[0].contains("normal approximation may be unreliable"));
        assert!(res.warnings[1].contains("small-effect threshold"));
    }

    #[test]
    fn failure_degrades_to_warning() {
        let engine = StatisticalPowerEngine::default();
        let res = engine.calculate_power(
            TestType::TwoSampleT,
            &SampleSize::PerGroup(30),
            EffectSize::hazard_ratio(0.7),
            Some(0.05),
            &TestExtras::default(),
        );
        assert_eq!(res.power, 0.0);
        assert_eq!(res.warnings.len(), 1);
        assert!(res.warnings[0].starts_with("calculate_power failed: "));

        let history = engine.history();
        assert_eq!(history.len(), 1);
        assert!(!history[0].success);
    }

    #[test]
    fn sample_size_scenario() {
        let engine = StatisticalPowerEngine::default();
        let res = engine.calculate_sample_size(
            TestType::TwoSampleT,
            0.8,
            EffectSize::cohens_d(0.5),
            Some(0.05),
            None,
            None,
            &TestExtras::default(),
        );
        assert!(res.convergence_achieved);
        // Per group; the total covers both arms
        assert!((60..=64).contains(&res.required_sample_size));
        assert_eq!(res.sample_size_total, 2 * res.required_sample_size);
        assert!(res.power_curve_points.len() >= 5);
    }

    #[test]
    fn sample_size_failure_is_minimal() {
        let engine = StatisticalPowerEngine::default();
        let res = engine.calculate_sample_size(
            TestType::TwoSampleT,
            1.5,
            EffectSize::cohens_d(0.5),
            None,
            None,
            None,
            &TestExtras::default(),
        );
        assert_eq!(res.required_sample_size, 1);
        assert!(!res.convergence_achieved);
        assert_eq!(res.warnings.len(), 1);
    }

    #[test]
    fn unsupported_conditional_power_degrades() {
        let engine = StatisticalPowerEngine::default();
        let res = engine.calculate_conditional_power(
            TestType::ChiSquareIndependence,
            EffectSize::cohens_w(0.3),
            50,
            100,
            None,
            &TestExtras::default(),
        );
        assert_eq!(res.conditional_power, 0.0);
        assert!(res.warnings[0].contains("conditional power is not available"));
    }

    #[test]
    fn obf_boundaries_scenario() {
        let engine = StatisticalPowerEngine::default();
        let res =
            engine.group_sequential_boundaries(Some(0.05), &[0.5, 1.0], &SpendingFcn::OBrienFleming);
        assert!(res.efficacy_boundaries[0] > res.efficacy_boundaries[1]);
        assert!(res.efficacy_boundaries[1] > 1.96);
        assert!((res.total_alpha_spent - 0.05).abs() < 1e-3);
    }

    #[test]
    fn bayesian_power_grows_with_n() {
        let engine = StatisticalPowerEngine::default();
        let power = |n| {
            engine
                .calculate_bayesian_power(n, 0.3, 0.0, 1.0, 0.975, BayesianMethod::ConjugateNormal)
                .posterior_power
        };
        assert!(power(100) > power(20));
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn history_is_append_only_until_cleared() {
        let engine = StatisticalPowerEngine::default();
        engine.reestimate_sample_size(1.5, 1.0, 100, 0.8);
        engine.reestimate_sample_size(-1.0, 1.0, 100, 0.8);
        let history = engine.history();
        assert_eq!(history.len(), 2);
        assert!(history[0].success);
        assert!(!history[1].success);
        assert_eq!(history[1].operation, "reestimate_sample_size");

        engine.clear_history();
        assert!(engine.history().is_empty());
        assert_eq!(engine.power_calculator().history_len(), 0);
    }

    #[test]
    fn results_flatten() {
        let engine = StatisticalPowerEngine::default();
        let flat = engine
            .reestimate_sample_size(1.5, 1.0, 100, 0.8)
            .to_flat_map();
        assert_eq!(flat["reestimated_sample_size"], serde_json::Value::from(150));
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StatisticalPowerEngine>();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.default_alpha = 0.0;
        assert!(StatisticalPowerEngine::try_new(config).is_err());
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let mut config = EngineConfig::default();
        config.bayesian.simulations = 0;
        let engine = StatisticalPowerEngine::new(config);
        assert_eq!(engine.config(), &EngineConfig::default());

        let history = engine.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].operation, "configure");
        assert!(!history[0].success);

        let res =
            engine.calculate_bayesian_power(50, 0.3, 0.0, 1.0, 0.975, BayesianMethod::Simulation);
        assert!((0.0..=1.0).contains(&res.posterior_power));
        assert!(res.posterior_power > 0.0);
    }

    #[test]
    fn largest_seed_simulates() {
        let mut config = EngineConfig::default();
        config.bayesian.seed = u64::MAX;
        let engine = StatisticalPowerEngine::try_new(config).unwrap();
        let res =
            engine.calculate_bayesian_power(50, 0.3, 0.0, 1.0, 0.975, BayesianMethod::Simulation);
        assert!(res.posterior_power > 0.0);
        assert!(!res.warnings.iter().any(|w| w.contains("failed")));
    }

    #[test]
    fn overflowing_group_sizes_degrade() {
        let engine = StatisticalPowerEngine::default();
        let res = engine.calculate_power(
            TestType::TwoSampleT,
            &SampleSize::TwoGroups(usize::MAX, 2),
            EffectSize::cohens_d(0.5),
            None,
            &TestExtras::default(),
        );
        assert_eq!(res.power, 0.0);
        assert_eq!(res.sample_size_total, usize::MAX);
        assert!(res.warnings[0].contains("overflow the total sample size"));
    }

    #[test]
    fn proportion_conditional_power_uses_interim_effect() {
        let engine = StatisticalPowerEngine::default();
        let extras = TestExtras::default().with_proportions(0.6, 0.4);
        let res = engine.calculate_conditional_power(
            TestType::TwoSampleProportion,
            EffectSize::cohens_h(0.0),
            50,
            100,
            None,
            &extras,
        );
        assert_eq!(res.decision, InterimDecision::ConsiderFutilityStop);
        assert!(res.conditional_power < 0.01);
    }
}
