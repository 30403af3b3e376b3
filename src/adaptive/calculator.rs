//----------------------------------------
// Adaptive design calculator
//----------------------------------------
use crate::adaptive::error::AdaptiveErr;
use crate::adaptive::types::{
    AdaptiveAnalysisResult, ConditionalPowerResult, DesignType, GroupSequentialBoundaries,
    InterimDecision, ReestimationResult,
};
use crate::config::{ReestimationConfig, SequentialConfig, SolverConfig};
use crate::distributions::std_normal::{std_normal_quantile, std_normal_sf};
use crate::error::CtpowerErr;
use crate::power::calculator::PowerCalculator;
use crate::power::types::{EffectSize, SampleSize, TestExtras, TestType};
use crate::sample_size::error::SampleSizeErr;
use crate::sample_size::solver::SampleSizeSolver;
use crate::sequential::boundaries::{BoundsSearch, find_bounds, total_type_one_error};
use crate::sequential::exit_probability::stopping_probabilities;
use crate::spending::error::SpendingFcnErr;
use crate::spending::spending_fcns::compute_spending_vec;
use crate::spending::types::SpendingFcn;
use crate::util::root_find::root_find_monotonic;
use itertools::Itertools;
use tracing::debug;

// Conditional power below this suggests stopping for futility
const FUTILITY_CONDITIONAL_POWER: f64 = 0.2;

// Interim looks before this fraction give unstable trend estimates
const EARLY_LOOK_FRACTION: f64 = 0.25;

const DRIFT_TOL: f64 = 1e-7;

// Sample sizes that land within this of an integer are not rounded up
fn ceil_n(x: f64) -> usize {
    (x - 1e-9).ceil().max(1.0) as usize
}

/// Group-sequential boundaries, adaptive study designs, conditional power
/// and variance-based sample size re-estimation
#[derive(Debug, Clone, Default)]
pub struct AdaptiveDesignCalculator {
    sequential: SequentialConfig,
    reestimation: ReestimationConfig,
    solver: SampleSizeSolver,
}

impl AdaptiveDesignCalculator {
    pub fn new(
        sequential: SequentialConfig,
        reestimation: ReestimationConfig,
        solver: SolverConfig,
    ) -> Self {
        AdaptiveDesignCalculator {
            sequential,
            reestimation,
            solver: SampleSizeSolver::new(solver),
        }
    }

    fn search(&self) -> BoundsSearch {
        BoundsSearch {
            r: self.sequential.quadrature_points,
            tol: self.sequential.boundary_tolerance,
            max_steps: self.sequential.max_bisection_steps,
        }
    }

    /// Two-sided boundaries; each side spends alpha / 2 and the futility
    /// boundaries mirror the efficacy ones
    pub fn group_sequential_boundaries(
        &self,
        alpha: f64,
        information_fractions: &[f64],
        spending_fcn: &SpendingFcn,
    ) -> Result<GroupSequentialBoundaries, CtpowerErr> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(SpendingFcnErr::BadAlpha(alpha).into());
        }
        let per_side = compute_spending_vec(information_fractions, alpha / 2., spending_fcn)?;
        let bounds = find_bounds(&per_side, information_fractions, self.search())?;
        let total_alpha_spent = total_type_one_error(
            &bounds,
            information_fractions,
            self.sequential.quadrature_points,
        );

        let cumulative_alpha_spent: Vec<f64> = per_side.iter().map(|a| 2. * a).collect();
        let incremental_alpha: Vec<f64> = std::iter::once(cumulative_alpha_spent[0])
            .chain(
                cumulative_alpha_spent
                    .iter()
                    .tuple_windows()
                    .map(|(a, b)| b - a),
            )
            .collect();

        let mut warnings = vec![];
        if !self.controls_type_one_error(total_alpha_spent, alpha) {
            warnings.push(format!(
                "type I error not controlled: boundaries spend {total_alpha_spent:.5} \
                 against nominal alpha {alpha}"
            ));
        }
        debug!(
            spending = %spending_fcn,
            looks = information_fractions.len(),
            total_alpha_spent,
            "computed group sequential boundaries"
        );

        Ok(GroupSequentialBoundaries {
            information_fractions: information_fractions.to_vec(),
            efficacy_boundaries: bounds.iter().map(|b| b.1).collect(),
            futility_boundaries: bounds.iter().map(|b| b.0).collect(),
            cumulative_alpha_spent,
            incremental_alpha,
            total_alpha_spent,
            spending_function: spending_fcn.to_string(),
            warnings,
        })
    }

    fn controls_type_one_error(&self, total_alpha_spent: f64, alpha: f64) -> bool {
        (total_alpha_spent - alpha).abs() <= self.sequential.alpha_tolerance
    }

    /// Sizes a group sequential or sample size re-estimation study around
    /// the fixed design that reaches `target_power`. Sample sizes are per
    /// group.
    #[allow(clippy::too_many_arguments)]
    pub fn design_study(
        &self,
        calculator: &PowerCalculator,
        design_type: DesignType,
        test_type: TestType,
        effect_size: EffectSize,
        alpha: f64,
        target_power: f64,
        information_fractions: &[f64],
        spending_fcn: &SpendingFcn,
        extras: &TestExtras,
    ) -> Result<AdaptiveAnalysisResult, CtpowerErr> {
        //----------------------------------------
        // Fixed design
        let fixed = self.solver.solve(
            calculator,
            test_type,
            target_power,
            effect_size,
            alpha,
            None,
            None,
            extras,
        )?;
        let n_fixed = fixed.required_sample_size;
        let mut warnings = fixed.warnings.clone();
        let mut recommendations = fixed.recommendations.clone();

        //----------------------------------------
        // Looks and boundaries
        let fractions = match design_type {
            DesignType::GroupSequential => information_fractions.to_vec(),
            DesignType::SampleSizeReestimation => {
                let interim = information_fractions
                    .first()
                    .copied()
                    .filter(|&t| t > 0.0 && t < 1.0)
                    .unwrap_or(0.5);
                vec![interim, 1.0]
            }
        };
        let boundaries = self.group_sequential_boundaries(alpha, &fractions, spending_fcn)?;
        let bounds: Vec<(f64, f64)> = boundaries
            .futility_boundaries
            .iter()
            .copied()
            .zip(boundaries.efficacy_boundaries.iter().copied())
            .collect();
        let r = self.sequential.quadrature_points;

        //----------------------------------------
        // Sizes
        let z_alpha = -std_normal_quantile(alpha / 2.)?;
        let z_beta = -std_normal_quantile(1. - target_power)?;
        let theta_fixed = z_alpha + z_beta;

        let (theta, n_max, inflation_factor) = match design_type {
            DesignType::GroupSequential => {
                let upper_power = |theta: f64| -> f64 {
                    stopping_probabilities(&bounds, &fractions, theta, r)
                        .iter()
                        .map(|(_, upper)| upper)
                        .sum()
                };
                let theta_gs = root_find_monotonic(
                    upper_power,
                    0.0,
                    target_power,
                    DRIFT_TOL,
                    self.sequential.max_bisection_steps,
                )?;
                let inflation = (theta_gs / theta_fixed).powi(2).max(1.0);
                debug!(theta_fixed, theta_gs, inflation, "drift search finished");
                (theta_gs, ceil_n(n_fixed as f64 * inflation), inflation)
            }
            DesignType::SampleSizeReestimation => {
                let n_max = ceil_n(n_fixed as f64 * self.reestimation.max_multiplier);
                (theta_fixed, n_max, n_max as f64 / n_fixed as f64)
            }
        };

        let stopping: Vec<f64> = stopping_probabilities(&bounds, &fractions, theta, r)
            .iter()
            .map(|(lower, upper)| lower + upper)
            .collect();
        let (interim_stops, _) = stopping.split_at(stopping.len() - 1);
        let p_continue = (1. - interim_stops.iter().sum::<f64>()).clamp(0., 1.);
        let mut stopping_probabilities = interim_stops.to_vec();
        stopping_probabilities.push(p_continue);

        let (initial_sample_size, expected_sample_size) = match design_type {
            DesignType::GroupSequential => {
                let look_n: Vec<usize> =
                    fractions.iter().map(|t| ceil_n(t * n_max as f64)).collect();
                let expected = interim_stops
                    .iter()
                    .zip(look_n.iter())
                    .map(|(p, &n)| p * n as f64)
                    .sum::<f64>()
                    + p_continue * n_max as f64;
                (look_n[0], expected)
            }
            DesignType::SampleSizeReestimation => {
                // Planned as the fixed design; the look re-sizes it
                let interim_n = ceil_n(fractions[0] * n_fixed as f64);
                let expected = interim_stops[0] * interim_n as f64 + p_continue * n_fixed as f64;
                (n_fixed, expected)
            }
        };
        debug!(
            design_type = %design_type,
            n_fixed,
            n_max,
            expected_sample_size,
            "designed adaptive study"
        );

        //----------------------------------------
        // Advice
        let type_i_error_control =
            self.controls_type_one_error(boundaries.total_alpha_spent, alpha);
        warnings.extend(boundaries.warnings.iter().cloned());
        if !type_i_error_control {
            recommendations.push(String::from(
                "increase the quadrature size or review the spending function before relying on these boundaries",
            ));
        }
        if fractions.len() == 1 {
            warnings.push(String::from(
                "a single analysis at full information is a fixed design",
            ));
        }
        if design_type == DesignType::SampleSizeReestimation {
            recommendations.push(format!(
                "re-estimate at information fraction {} with the interim variance; \
                 the sample size may grow up to {n_max} per group",
                fractions[0]
            ));
        }

        Ok(AdaptiveAnalysisResult {
            design_type,
            test_type,
            initial_sample_size,
            maximum_sample_size: n_max.max(initial_sample_size),
            fixed_sample_size: n_fixed,
            inflation_factor,
            interim_analyses: fractions,
            efficacy_boundaries: boundaries.efficacy_boundaries,
            futility_boundaries: boundaries.futility_boundaries,
            alpha_spending_function: boundaries.spending_function,
            type_i_error_control,
            cumulative_alpha: boundaries.cumulative_alpha_spent,
            expected_sample_size,
            stopping_probabilities,
            warnings,
            recommendations,
        })
    }

    /// Current-trend conditional power after `interim_n` of `final_n`
    /// subjects per group, with the interim z statistic implied by
    /// `interim_effect` for the test family
    #[allow(clippy::too_many_arguments)]
    pub fn conditional_power(
        &self,
        calculator: &PowerCalculator,
        test_type: TestType,
        interim_effect: EffectSize,
        interim_n: usize,
        final_n: usize,
        alpha: f64,
        extras: &TestExtras,
    ) -> Result<ConditionalPowerResult, CtpowerErr> {
        //----------------------------------------
        // Check arguments
        if interim_n == 0 || interim_n >= final_n {
            return Err(AdaptiveErr::BadInterimSizes {
                interim: interim_n,
                final_n,
            }
            .into());
        }
        if !interim_effect.value.is_finite() {
            return Err(AdaptiveErr::BadInterimEffect(interim_effect.value).into());
        }
        // Planned proportions describe the design, not the interim data; the
        // observed difference must come in through the effect size
        let observed = TestExtras {
            p1: None,
            p2: None,
            ..extras.clone()
        };
        let interim_z = calculator
            .expected_z(
                test_type,
                &SampleSize::PerGroup(interim_n),
                interim_effect,
                alpha,
                &observed,
            )?
            .ok_or(AdaptiveErr::UnsupportedTest {
                test_type,
                operation: "conditional power",
            })?
            .abs();

        //----------------------------------------
        // Current trend
        let t = interim_n as f64 / final_n as f64;
        let critical_value = -std_normal_quantile(alpha / 2.)?;
        let b_value = interim_z * t.sqrt();
        let drift = interim_z / t.sqrt();
        let conditional_power =
            std_normal_sf((critical_value - b_value - drift * (1. - t)) / (1. - t).sqrt())
                .clamp(0., 1.);
        let efficacy_boundary = critical_value / t.sqrt();

        let decision = if interim_z >= efficacy_boundary {
            InterimDecision::StopForEfficacy
        } else if conditional_power < FUTILITY_CONDITIONAL_POWER {
            InterimDecision::ConsiderFutilityStop
        } else {
            InterimDecision::Continue
        };
        debug!(
            test_type = %test_type,
            interim_z,
            t,
            conditional_power,
            decision = %decision,
            "computed conditional power"
        );

        let mut warnings = vec![];
        let mut recommendations = vec![];
        if t < EARLY_LOOK_FRACTION {
            warnings.push(format!(
                "interim look at information fraction {t:.3} gives an unstable trend estimate"
            ));
        }
        match decision {
            InterimDecision::StopForEfficacy => recommendations.push(format!(
                "interim z {interim_z:.3} crosses the efficacy boundary {efficacy_boundary:.3}; \
                 consider stopping for efficacy"
            )),
            InterimDecision::ConsiderFutilityStop => recommendations.push(format!(
                "conditional power {conditional_power:.3} is below {FUTILITY_CONDITIONAL_POWER}; \
                 consider stopping for futility"
            )),
            InterimDecision::Continue => recommendations.push(String::from(
                "continue to the planned final analysis",
            )),
        }

        Ok(ConditionalPowerResult {
            test_type,
            conditional_power,
            information_fraction: t,
            interim_z,
            critical_value,
            efficacy_boundary,
            decision,
            warnings,
            recommendations,
        })
    }

    /// Scales `original_n` by the ratio of interim to planned variance,
    /// clamped to the configured multiplier range
    pub fn reestimate_sample_size(
        &self,
        interim_variance: f64,
        planned_variance: f64,
        original_n: usize,
        target_power: f64,
    ) -> Result<ReestimationResult, CtpowerErr> {
        //----------------------------------------
        // Check arguments
        for (name, value) in [
            ("interim variance", interim_variance),
            ("planned variance", planned_variance),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(AdaptiveErr::BadVariance { name, value }.into());
            }
        }
        if original_n == 0 {
            return Err(AdaptiveErr::BadOriginalSize.into());
        }
        if !(target_power > 0.0 && target_power < 1.0) {
            return Err(SampleSizeErr::BadTargetPower(target_power).into());
        }

        //----------------------------------------
        // Rescale and clamp
        let variance_ratio = interim_variance / planned_variance;
        let n = original_n as f64;
        let raw = ceil_n(n * variance_ratio);
        let floor = ceil_n(n * self.reestimation.min_multiplier);
        let ceiling = ((n * self.reestimation.max_multiplier + 1e-9).floor() as usize).max(floor);
        let reestimated_sample_size = raw.clamp(floor, ceiling);
        let clamped = reestimated_sample_size != raw;
        debug!(
            variance_ratio,
            raw, reestimated_sample_size, clamped, "re-estimated sample size"
        );

        let mut warnings = vec![];
        let mut recommendations = vec![];
        if clamped {
            warnings.push(format!(
                "re-estimated sample size {raw} clamped to {reestimated_sample_size} \
                 (allowed range {floor} to {ceiling})"
            ));
            recommendations.push(String::from(
                "check the interim variance estimate; a ratio this far from 1 may reflect noise or a misspecified plan",
            ));
        }
        if reestimated_sample_size < original_n {
            recommendations.push(String::from(
                "reducing the sample size after an interim look should be pre-specified in the protocol",
            ));
        }

        Ok(ReestimationResult {
            original_sample_size: original_n,
            reestimated_sample_size,
            variance_ratio,
            multiplier: reestimated_sample_size as f64 / n,
            clamped,
            target_power,
            warnings,
            recommendations,
        })
    }
}
