use crate::distributions::error::DistributionErr;
use crate::error::CtpowerErr;
use statrs::function::erf::{erfc, erfc_inv};

pub fn std_normal_pdf(z: f64) -> f64 {
    (-z * z / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

pub fn std_normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

/// Upper tail, 1 - Phi(z), without cancellation for large z
pub fn std_normal_sf(z: f64) -> f64 {
    std_normal_cdf(-z)
}

pub fn std_normal_quantile(p: f64) -> Result<f64, CtpowerErr> {
    if !(p > 0.0 && p < 1.0) {
        return Err(DistributionErr::QuantileOutOfBounds(p).into());
    }
    Ok(-std::f64::consts::SQRT_2 * erfc_inv(2.0 * p))
}
