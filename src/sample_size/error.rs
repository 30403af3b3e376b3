//----------------------------------------
// sample size errors
//----------------------------------------
use crate::error::CtpowerErr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleSizeErr {
    #[error("target power should be in (0, 1); got {0}")]
    BadTargetPower(f64),
    #[error("sample size bounds should satisfy 1 <= min <= max; got ({min}, {max})")]
    BadBounds { min: usize, max: usize },
    #[error("allocation ratio should be positive and finite; got {0}")]
    BadAllocationRatio(f64),
}

impl From<SampleSizeErr> for CtpowerErr {
    fn from(e: SampleSizeErr) -> CtpowerErr {
        CtpowerErr::SampleSize(e)
    }
}
