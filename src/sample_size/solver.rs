//----------------------------------------
// Sample size solver
//----------------------------------------
use crate::config::SolverConfig;
use crate::error::CtpowerErr;
use crate::power::calculator::PowerCalculator;
use crate::power::types::{EffectSize, SampleSize, TestExtras, TestType, total_sample_size};
use crate::sample_size::error::SampleSizeErr;
use crate::sample_size::types::SampleSizeCalculation;
use crate::util::root_find::min_sufficient_n;
use itertools::Itertools;
use tracing::debug;

/// Finds the smallest per-group n whose power reaches a target, treating
/// the power calculator as a monotone oracle in n
#[derive(Debug, Clone, Default)]
pub struct SampleSizeSolver {
    config: SolverConfig,
}

impl SampleSizeSolver {
    pub fn new(config: SolverConfig) -> Self {
        SampleSizeSolver { config }
    }

    /// `bounds` limits the per-group n searched over and defaults to the
    /// smallest n the test is defined for up to the configured maximum.
    /// `allocation_ratio` (n2 / n1) overrides the one in `extras`.
    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        &self,
        calculator: &PowerCalculator,
        test_type: TestType,
        target_power: f64,
        effect_size: EffectSize,
        alpha: f64,
        bounds: Option<(usize, usize)>,
        allocation_ratio: Option<f64>,
        extras: &TestExtras,
    ) -> Result<SampleSizeCalculation, CtpowerErr> {
        //----------------------------------------
        // Check arguments
        if !(target_power > 0.0 && target_power < 1.0) {
            return Err(SampleSizeErr::BadTargetPower(target_power).into());
        }
        let mut extras = extras.clone();
        if let Some(ratio) = allocation_ratio {
            extras.allocation_ratio = Some(ratio);
        }
        let ratio = extras.allocation_ratio();
        if !(ratio > 0.0 && ratio.is_finite()) {
            return Err(SampleSizeErr::BadAllocationRatio(ratio).into());
        }

        let floor = test_type.min_group_size(&extras);
        let (min_n, max_n) = bounds.unwrap_or((floor, self.config.max_sample_size));
        if min_n == 0 || min_n > max_n {
            return Err(SampleSizeErr::BadBounds {
                min: min_n,
                max: max_n,
            }
            .into());
        }
        let min_n = min_n.max(floor);
        let max_n = max_n.max(min_n);

        //----------------------------------------
        // Search
        let oracle = |n: usize| {
            calculator.power(
                test_type,
                &SampleSize::PerGroup(n),
                effect_size,
                alpha,
                &extras,
            )
        };
        let search = min_sufficient_n(
            &oracle,
            min_n,
            max_n,
            target_power,
            self.config.max_iterations,
        )?;
        debug!(
            test_type = %test_type,
            n = search.n,
            power = search.value,
            converged = search.converged,
            iterations = search.iterations,
            "sample size search finished"
        );

        //----------------------------------------
        // Power curve
        let n_points = self.config.curve_points.max(5);
        let top = search.n.max(min_n + n_points - 1);
        let power_curve_points = (0..n_points)
            .map(|i| {
                let step = (top - min_n) as f64 * i as f64 / (n_points - 1) as f64;
                min_n + step.round() as usize
            })
            .dedup()
            .map(|n| oracle(n).map(|p| (n, p)))
            .collect::<Result<Vec<(usize, f64)>, CtpowerErr>>()?;

        //----------------------------------------
        // Assemble
        let sample_size_per_group = SampleSize::PerGroup(search.n)
            .group_sizes(test_type.n_groups(&extras), ratio);
        let mut warnings = vec![];
        let mut recommendations = vec![];
        if !search.converged {
            warnings.push(format!(
                "target power {target_power} not reached within n <= {max_n} \
                 (best achievable power {:.4})",
                search.value
            ));
            recommendations.push(String::from(
                "increase the assumed effect size if clinically justified",
            ));
            recommendations.push(format!(
                "widen the sample size bounds beyond {max_n} per group"
            ));
            recommendations.push(String::from(
                "relax the power target or the significance level",
            ));
        }

        Ok(SampleSizeCalculation {
            test_type,
            required_sample_size: search.n,
            power_achieved: search.value,
            target_power,
            alpha,
            effect_size: effect_size.value,
            effect_size_type: effect_size.kind,
            sample_size_total: total_sample_size(&sample_size_per_group),
            total_groups: sample_size_per_group.len(),
            sample_size_per_group,
            allocation_ratio: ratio,
            convergence_achieved: search.converged,
            iterations: search.iterations,
            power_curve_points,
            warnings,
            recommendations,
        })
    }
}
