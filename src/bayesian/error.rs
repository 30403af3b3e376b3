//----------------------------------------
// bayesian errors
//----------------------------------------
use crate::error::CtpowerErr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BayesianErr {
    #[error("prior variance should be positive and finite; got {0}")]
    BadPriorVariance(f64),
    #[error("decision threshold should be in (0, 1); got {0}")]
    BadThreshold(f64),
    #[error("sample size should be at least 1")]
    BadSampleSize,
    #[error("{name} should be finite; got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("at least 2 finite observations are needed; got {0}")]
    InsufficientData(usize),
    #[error("observed data have zero variance")]
    ZeroVariance,
    #[error("simulation needs at least one draw")]
    NoSimulations,
    #[error("unknown Bayesian method: {0}")]
    UnknownMethod(String),
}

impl From<BayesianErr> for CtpowerErr {
    fn from(e: BayesianErr) -> CtpowerErr {
        CtpowerErr::Bayesian(e)
    }
}
