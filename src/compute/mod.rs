//----------------------------------------
// compute mod
//----------------------------------------
pub use crate::adaptive::calculator::AdaptiveDesignCalculator;
pub use crate::bayesian::calculator::BayesianPowerCalculator;
pub use crate::distributions::critical::{chi_squared_quantile, f_quantile, t_quantile};
pub use crate::distributions::noncentral::{
    noncentral_chi_squared_cdf, noncentral_f_cdf, noncentral_t_cdf,
};
pub use crate::distributions::std_normal::{
    std_normal_cdf, std_normal_pdf, std_normal_quantile, std_normal_sf,
};
pub use crate::power::calculator::PowerCalculator;
pub use crate::sample_size::solver::SampleSizeSolver;
pub use crate::spending::spending_fcns::compute_spending_vec;
