use crate::error::CtpowerErr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RootFindErr {
    #[error("f(lower_bound) is larger than target; use smaller lower bound")]
    BadLowerBound,
    #[error("target {target} not bracketed after {steps} doublings (f(upper) = {reached})")]
    NotBracketed {
        target: f64,
        reached: f64,
        steps: usize,
    },
}

impl From<RootFindErr> for CtpowerErr {
    fn from(e: RootFindErr) -> CtpowerErr {
        CtpowerErr::RootFind(e)
    }
}

/// Given a monotonically increasing function f(x) and lower bound, finds
/// value x' to the right of the lower bound such that f(x') = target.
/// Both the bracketing and the bisection stop after `max_steps` evaluations.
pub fn root_find_monotonic<F>(
    f: F,
    lower_bound: f64,
    target: f64,
    tol: f64,
    max_steps: usize,
) -> Result<f64, CtpowerErr>
where
    F: Fn(f64) -> f64,
{
    if f(lower_bound) >= target {
        return Err(RootFindErr::BadLowerBound.into());
    }
    // Set window for search
    let mut lower_bound = lower_bound;
    let mut upper_bound = lower_bound;
    let mut safety = 0;
    let mut f_upper_bound = f(upper_bound);
    while f_upper_bound < target && safety < max_steps {
        upper_bound *= 2.;
        upper_bound += 1.; // In case lower_bound is zero
        f_upper_bound = f(upper_bound);
        safety += 1;
    }
    if f_upper_bound < target {
        return Err(RootFindErr::NotBracketed {
            target,
            reached: f_upper_bound,
            steps: safety,
        }
        .into());
    }

    // Perform search
    let mut x = (lower_bound + upper_bound) / 2.;
    let mut y = f(x);
    let mut steps = 0;
    while (lower_bound - upper_bound).abs() > tol / 2. && (y - target).abs() > tol && steps < max_steps
    {
        if y <= target {
            lower_bound = x;
        } else {
            upper_bound = x;
        }
        x = (lower_bound + upper_bound) / 2.;
        y = f(x);
        steps += 1;
    }
    Ok(x)
}

/// Outcome of an integer search for the smallest sufficient n
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerSearch {
    /// Smallest n meeting the target, or the upper bound when none does
    pub n: usize,
    pub value: f64,
    pub converged: bool,
    pub iterations: usize,
}

/// Smallest n in [lo, hi] with f(n) >= target, assuming f is
/// non-decreasing in n. Evaluates f at most `max_iterations` times; if the
/// budget runs out the best sufficient n found so far is returned.
pub fn min_sufficient_n<F>(
    f: F,
    lo: usize,
    hi: usize,
    target: f64,
    max_iterations: usize,
) -> Result<IntegerSearch, CtpowerErr>
where
    F: Fn(usize) -> Result<f64, CtpowerErr>,
{
    let f_hi = f(hi)?;
    let mut iterations = 1;
    if f_hi < target {
        return Ok(IntegerSearch {
            n: hi,
            value: f_hi,
            converged: false,
            iterations,
        });
    }

    let f_lo = f(lo)?;
    iterations += 1;
    if f_lo >= target {
        return Ok(IntegerSearch {
            n: lo,
            value: f_lo,
            converged: true,
            iterations,
        });
    }

    // Invariant: f(lo) < target <= f(hi)
    let (mut lo, mut hi, mut f_best) = (lo, hi, f_hi);
    while hi - lo > 1 && iterations < max_iterations {
        let mid = lo + (hi - lo) / 2;
        let f_mid = f(mid)?;
        iterations += 1;
        if f_mid >= target {
            hi = mid;
            f_best = f_mid;
        } else {
            lo = mid;
        }
    }

    Ok(IntegerSearch {
        n: hi,
        value: f_best,
        converged: hi - lo <= 1,
        iterations,
    })
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn basic_linear_root_find() {
        let f = |x| x;
        let res = root_find_monotonic(f, 0.0, 3., 0.001, 100)
            .expect("failed to perform linear root find");
        assert!((res - 3.0).abs() < 0.001);
    }

    #[test]
    fn basic_quadratic_root_find() {
        let f = |x| x * x;
        let res = root_find_monotonic(f, 0.0, 9., 0.001, 100)
            .expect("failed to perform quadratic root find");
        assert!((res - 3.0).abs() < 0.001);
    }

    #[test]
    fn unbracketed_root_find() {
        let f = |x: f64| 1. - (-x).exp();
        assert!(matches!(
            root_find_monotonic(f, 0.0, 2., 0.001, 20),
            Err(CtpowerErr::RootFind(RootFindErr::NotBracketed { .. }))
        ));
    }

    #[test]
    fn integer_search_finds_threshold() {
        let res = min_sufficient_n(|n| Ok(n as f64), 1, 1_000, 437.5, 100).unwrap();
        assert_eq!(res.n, 438);
        assert!(res.converged);
        assert!(res.iterations <= 12);
    }

    #[test]
    fn integer_search_lower_bound_sufficient() {
        let res = min_sufficient_n(|n| Ok(n as f64), 10, 1_000, 5., 100).unwrap();
        assert_eq!(res.n, 10);
        assert!(res.converged);
    }

    #[test]
    fn integer_search_unreachable() {
        let res = min_sufficient_n(|_| Ok(0.05), 2, 100_000, 0.8, 100).unwrap();
        assert_eq!(res.n, 100_000);
        assert!(!res.converged);
        assert_eq!(res.iterations, 1);
    }

    #[test]
    fn integer_search_budget_exhausted() {
        let res = min_sufficient_n(|n| Ok(n as f64), 1, 1_000_000, 437.5, 5).unwrap();
        assert!(!res.converged);
        assert!(res.n >= 438);
        assert_eq!(res.iterations, 5);
    }
}
