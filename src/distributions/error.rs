//----------------------------------------
// distribution errors
//----------------------------------------
use crate::error::CtpowerErr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionErr {
    #[error("arguments to quantile function should be in (0, 1); got {0}")]
    QuantileOutOfBounds(f64),
    #[error("degrees of freedom should be positive and finite; got {0}")]
    BadDegreesOfFreedom(f64),
    #[error("noncentrality should be non-negative and finite; got {0}")]
    BadNoncentrality(f64),
}

impl From<DistributionErr> for CtpowerErr {
    fn from(e: DistributionErr) -> CtpowerErr {
        CtpowerErr::Distribution(e)
    }
}
