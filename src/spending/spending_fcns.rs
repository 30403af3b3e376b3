use crate::distributions::std_normal::{std_normal_quantile, std_normal_sf};
use crate::error::CtpowerErr;
use crate::spending::{error::SpendingFcnErr, types::SpendingFcn};
use itertools::Itertools;

/// Checks that look fractions are non-empty, strictly increasing, inside
/// (0, 1] and end at 1
pub fn check_look_fractions(look_fractions: &[f64]) -> Result<(), CtpowerErr> {
    if look_fractions.is_empty() {
        return Err(SpendingFcnErr::TimeVectorEmpty.into());
    }
    if let Some(&t) = look_fractions.iter().find(|&&t| !(t > 0.0 && t <= 1.0)) {
        return Err(SpendingFcnErr::OutOfBounds(t).into());
    }
    if !look_fractions.iter().tuple_windows().all(|(a, b)| a < b) {
        return Err(SpendingFcnErr::NotIncreasing("information fractions").into());
    }
    if let Some(&last) = look_fractions.last() {
        if last != 1.0 {
            return Err(SpendingFcnErr::BadLastSpend(last).into());
        }
    }
    Ok(())
}

// Returns cumulative alpha spent on one side at each look. The last entry
// is exactly alpha_per_side.
pub fn compute_spending_vec(
    look_fractions: &[f64],
    alpha_per_side: f64,
    spending_fcn: &SpendingFcn,
) -> Result<Vec<f64>, CtpowerErr> {
    //----------------------------------------
    // Check arguments
    check_look_fractions(look_fractions)?;
    if alpha_per_side <= 0.0 || alpha_per_side >= 1.0 {
        return Err(SpendingFcnErr::BadAlpha(alpha_per_side).into());
    }

    //----------------------------------------
    // Compute alpha spend
    match spending_fcn {
        SpendingFcn::OBrienFleming => look_fractions
            .iter()
            .map(|&t| lan_demets_obrien_fleming(t, alpha_per_side))
            .collect(),
        SpendingFcn::Pocock => look_fractions
            .iter()
            .map(|&t| lan_demets_pocock(t, alpha_per_side))
            .collect(),
        SpendingFcn::HwangShihDeCani(gamma) => look_fractions
            .iter()
            .map(|&t| hwang_shih_decani(t, alpha_per_side, *gamma))
            .collect(),
        SpendingFcn::Custom { cumulative_spend } => {
            custom(cumulative_spend, look_fractions.len(), alpha_per_side)
        }
    }
}

fn check_time(t: f64) -> Result<(), CtpowerErr> {
    if (0.0..=1.0).contains(&t) {
        Ok(())
    } else {
        Err(SpendingFcnErr::OutOfBounds(t).into())
    }
}

fn lan_demets_obrien_fleming(t: f64, alpha: f64) -> Result<f64, CtpowerErr> {
    check_time(t)?;
    if t == 1.0 {
        // Hardcode to avoid numerical precision issues
        Ok(alpha)
    } else if t == 0.0 {
        Ok(0.0)
    } else {
        let z_alpha = -std_normal_quantile(alpha / 2.)?;
        let spend = (2. * std_normal_sf(z_alpha / t.sqrt())).min(alpha);
        Ok(spend)
    }
}

fn lan_demets_pocock(t: f64, alpha: f64) -> Result<f64, CtpowerErr> {
    check_time(t)?;
    if t == 1.0 {
        Ok(alpha)
    } else {
        Ok(alpha * (1. + (std::f64::consts::E - 1.) * t).ln())
    }
}

fn hwang_shih_decani(t: f64, alpha: f64, gamma: f64) -> Result<f64, CtpowerErr> {
    check_time(t)?;
    if t == 1.0 {
        Ok(alpha)
    } else if gamma.abs() < 1e-10 {
        Ok(alpha * t)
    } else {
        Ok(alpha * (-(-gamma * t).exp_m1()) / (-(-gamma).exp_m1()))
    }
}

fn custom(cumulative_spend: &[f64], looks: usize, alpha: f64) -> Result<Vec<f64>, CtpowerErr> {
    if cumulative_spend.len() != looks {
        return Err(SpendingFcnErr::MismatchedLengths {
            spend: cumulative_spend.len(),
            looks,
        }
        .into());
    }
    if let Some(&s) = cumulative_spend.iter().find(|&&s| !(0.0..=1.0).contains(&s)) {
        return Err(SpendingFcnErr::OutOfBounds(s).into());
    }
    if !cumulative_spend.iter().tuple_windows().all(|(a, b)| a < b) {
        return Err(SpendingFcnErr::NotIncreasing("custom cumulative spend").into());
    }
    if let Some(&last) = cumulative_spend.last() {
        if (last - 1.0).abs() > 1e-12 {
            return Err(SpendingFcnErr::BadLastSpend(last).into());
        }
    }
    let mut spend: Vec<f64> = cumulative_spend.iter().map(|s| s * alpha).collect();
    // Exact at the final look
    if let Some(last) = spend.last_mut() {
        *last = alpha;
    }
    Ok(spend)
}
