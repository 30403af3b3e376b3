use crate::distributions::std_normal::std_normal_quantile;
use crate::error::CtpowerErr;
use crate::sequential::{
    error::TrialBoundsError, exit_probability::exit_probability, types::IntegralType,
};
use tracing::debug;

// Bounds are searched for in (0, ABS_MAX_Z)
const ABS_MAX_Z: f64 = 10.;

/// Search settings for `find_bounds`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsSearch {
    /// Quadrature size
    pub r: usize,
    /// How close each look's exit probability must be to its increment
    pub tol: f64,
    pub max_steps: usize,
}

/// Given cumulative alpha spent on one side and information fractions,
/// finds symmetric bounds (-b_k, b_k) such that under theta = 0 the
/// probability of first crossing b_k at look k equals the k-th increment.
/// A look with nothing left to spend gets an infinite bound.
pub fn find_bounds(
    cumulative_spend: &[f64],
    look_fractions: &[f64],
    search: BoundsSearch,
) -> Result<Vec<(f64, f64)>, CtpowerErr> {
    let mut bounds: Vec<(f64, f64)> =
        vec![(f64::NEG_INFINITY, f64::INFINITY); look_fractions.len()];

    let increments: Vec<f64> = cumulative_spend
        .iter()
        .scan(0.0, |spent, &c| {
            let inc = c - *spent;
            *spent = c;
            Some(inc)
        })
        .collect();

    for (i, &target_alpha) in increments.iter().enumerate() {
        if target_alpha <= 0.0 {
            continue;
        }

        // First bound is just Phi^-1(1 - increment)
        if i == 0 {
            let b = -std_normal_quantile(target_alpha)?;
            bounds[0] = (-b, b);
            continue;
        }

        let upper_exit = |b: f64, bounds: &mut [(f64, f64)]| {
            bounds[i] = (-b, b);
            exit_probability(
                &bounds[0..=i],
                &look_fractions[0..=i],
                0.0,
                IntegralType::Upper,
                search.r,
            )[i]
        };

        let (mut lower_bound, mut upper_bound) = (0.0, ABS_MAX_Z);
        let mut mid = (lower_bound + upper_bound) / 2.0;
        let mut cur_alpha = upper_exit(mid, &mut bounds);
        let mut diff: f64 = target_alpha - cur_alpha;
        let mut steps = 0;

        // Relative stopping rule so that tiny increments still get an
        // accurate bound
        while diff.abs() > search.tol * target_alpha
            && (upper_bound - lower_bound) > 1e-12
            && steps < search.max_steps
        {
            // Exit probability falls as the bound rises
            if cur_alpha <= target_alpha {
                upper_bound = mid;
            } else {
                lower_bound = mid;
            }
            mid = (lower_bound + upper_bound) / 2.0;
            cur_alpha = upper_exit(mid, &mut bounds);
            diff = target_alpha - cur_alpha;
            steps += 1;
        }
        debug!(look = i + 1, bound = mid, steps, diff, "boundary search finished");

        if diff.abs() > search.tol {
            return Err(TrialBoundsError::FailedToConverge {
                look: i + 1,
                computed: cur_alpha,
                target: target_alpha,
                tol: search.tol,
            }
            .into());
        }
    }

    Ok(bounds)
}

/// Probability of crossing either bound at any look under theta = 0
pub fn total_type_one_error(bounds: &[(f64, f64)], look_fractions: &[f64], r: usize) -> f64 {
    [IntegralType::Lower, IntegralType::Upper]
        .into_iter()
        .map(|side| {
            exit_probability(bounds, look_fractions, 0.0, side, r)
                .iter()
                .sum::<f64>()
        })
        .sum()
}
