//----------------------------------------
// Crate error type
//----------------------------------------
pub use crate::adaptive::error::AdaptiveErr;
pub use crate::bayesian::error::BayesianErr;
pub use crate::config::ConfigErr;
pub use crate::distributions::error::DistributionErr;
pub use crate::power::error::PowerErr;
pub use crate::sample_size::error::SampleSizeErr;
pub use crate::sequential::error::TrialBoundsError;
pub use crate::spending::error::SpendingFcnErr;
pub use crate::util::root_find::RootFindErr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CtpowerErr {
    #[error("while computing power: {0}")]
    Power(PowerErr),
    #[error("while evaluating distribution: {0}")]
    Distribution(DistributionErr),
    #[error("while computing sample size: {0}")]
    SampleSize(SampleSizeErr),
    #[error("while evaluating spending function: {0}")]
    SpendingFcn(SpendingFcnErr),
    #[error("while computing trial bounds: {0}")]
    TrialBounds(TrialBoundsError),
    #[error("while computing adaptive design: {0}")]
    Adaptive(AdaptiveErr),
    #[error("while computing Bayesian power: {0}")]
    Bayesian(BayesianErr),
    #[error("while root finding: {0}")]
    RootFind(RootFindErr),
    #[error("while loading configuration: {0}")]
    Config(ConfigErr),
}
