use crate::distributions::std_normal::{std_normal_cdf, std_normal_pdf, std_normal_sf};
use crate::sequential::{quadrature::Quadrature, types::IntegralType};

// J&T p. 354
fn f_1(z_1: f64, info_1: f64, theta: f64) -> f64 {
    std_normal_pdf(z_1 - theta * info_1.sqrt())
}

// Density of Z_k at z_k given Z_{k-1} = z_k_1
fn f_k(z_k_1: f64, info_k_1: f64, z_k: f64, theta: f64, info_k: f64) -> f64 {
    let delta_k = info_k - info_k_1;
    let sqrt_delta_k = delta_k.sqrt();
    let shift = z_k * info_k.sqrt() - z_k_1 * info_k_1.sqrt() - theta * delta_k;
    if shift.is_nan() {
        return 0.;
    }
    info_k.sqrt() / sqrt_delta_k * std_normal_pdf(shift / sqrt_delta_k)
}

// e_k in J&T's notation
fn upper_exit_prob(z_k_1: f64, info_k_1: f64, b_k: f64, info_k: f64, theta: f64) -> f64 {
    let delta_k = info_k - info_k_1;
    std_normal_cdf(
        (z_k_1 * info_k_1.sqrt() + theta * delta_k - b_k * info_k.sqrt()) / delta_k.sqrt(),
    )
}

// Probability of falling below a_k; mirror image of e_k
fn lower_exit_prob(z_k_1: f64, info_k_1: f64, a_k: f64, info_k: f64, theta: f64) -> f64 {
    let delta_k = info_k - info_k_1;
    std_normal_cdf(
        (a_k * info_k.sqrt() - z_k_1 * info_k_1.sqrt() - theta * delta_k) / delta_k.sqrt(),
    )
}

/// Sub-densities h_k of the statistic on the continuation region of every
/// look, J&T p. 355. Entry k pairs with the grid of look k.
fn sub_densities(
    bounds: &[(f64, f64)],
    look_fractions: &[f64],
    theta: f64,
    r: usize,
) -> (Vec<Quadrature>, Vec<Vec<f64>>) {
    let quadratures: Vec<Quadrature> = bounds
        .iter()
        .zip(look_fractions.iter())
        .map(|(&(a_k, b_k), &info_k)| Quadrature::new(theta, info_k, r, a_k, b_k))
        .collect();

    let mut h: Vec<Vec<f64>> = Vec::with_capacity(quadratures.len());
    for (i, quad) in quadratures.iter().enumerate() {
        let v = if i == 0 {
            quad.w
                .iter()
                .zip(quad.z.iter())
                .map(|(&w_k, &z_k)| w_k * f_1(z_k, look_fractions[0], theta))
                .collect()
        } else {
            let h_prev = &h[i - 1];
            let q_prev = &quadratures[i - 1];
            let info_prev = look_fractions[i - 1];
            let info_k = look_fractions[i];
            quad.w
                .iter()
                .zip(quad.z.iter())
                .map(|(&w_k, &z_k)| {
                    h_prev
                        .iter()
                        .zip(q_prev.z.iter())
                        .map(|(h_k_1, &z_k_1)| h_k_1 * w_k * f_k(z_k_1, info_prev, z_k, theta, info_k))
                        .sum()
                })
                .collect()
        };
        h.push(v);
    }
    (quadratures, h)
}

/// Probability of first crossing the upper (or lower) bound at each look
/// when the final z statistic has mean `theta`. Information is measured as
/// a fraction of the maximum, so look k has mean theta sqrt(t_k). r controls
/// quadrature size.
pub fn exit_probability(
    bounds: &[(f64, f64)],
    look_fractions: &[f64],
    theta: f64,
    integral_type: IntegralType,
    r: usize,
) -> Vec<f64> {
    if bounds.is_empty() {
        return vec![];
    }
    // The last look's continuation density is never needed
    let k_max = look_fractions.len().min(bounds.len());
    let (quadratures, h) = sub_densities(&bounds[..k_max - 1], &look_fractions[..k_max - 1], theta, r);

    let mut res = Vec::with_capacity(k_max);

    // First look is just the tail of N(theta sqrt(t_1), 1)
    let mean_1 = theta * look_fractions[0].sqrt();
    res.push(match integral_type {
        IntegralType::Lower => std_normal_cdf(bounds[0].0 - mean_1),
        IntegralType::Upper => std_normal_sf(bounds[0].1 - mean_1),
    });

    let final_integral = match integral_type {
        IntegralType::Upper => upper_exit_prob,
        IntegralType::Lower => lower_exit_prob,
    };

    for i in 1..k_max {
        let final_bound = match integral_type {
            IntegralType::Upper => bounds[i].1,
            IntegralType::Lower => bounds[i].0,
        };
        let info_prev = look_fractions[i - 1];
        let info_k = look_fractions[i];
        let prob: f64 = h[i - 1]
            .iter()
            .zip(quadratures[i - 1].z.iter())
            .map(|(&h_k_1, &z_k_1)| h_k_1 * final_integral(z_k_1, info_prev, final_bound, info_k, theta))
            .sum();
        res.push(prob);
    }

    res
}

/// (lower, upper) exit probabilities at every look
pub fn stopping_probabilities(
    bounds: &[(f64, f64)],
    look_fractions: &[f64],
    theta: f64,
    r: usize,
) -> Vec<(f64, f64)> {
    let lower = exit_probability(bounds, look_fractions, theta, IntegralType::Lower, r);
    let upper = exit_probability(bounds, look_fractions, theta, IntegralType::Upper, r);
    lower.into_iter().zip(upper).collect()
}
