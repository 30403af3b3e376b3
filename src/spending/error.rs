//----------------------------------------
// spending errors
//----------------------------------------
use crate::error::CtpowerErr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpendingFcnErr {
    #[error("arguments to spending function should be in [0, 1]; got {0}")]
    OutOfBounds(f64),
    #[error("spending function vector should end with 1.0; got {0}")]
    BadLastSpend(f64),
    #[error("time vector was empty")]
    TimeVectorEmpty,
    #[error("total alpha spent should be in (0, 1); got {0}")]
    BadAlpha(f64),
    #[error("custom spending has {spend} values for {looks} looks")]
    MismatchedLengths { spend: usize, looks: usize },
    #[error("{0} should be strictly increasing")]
    NotIncreasing(&'static str),
    #[error("unknown spending function: {0}")]
    UnknownSpendingFcn(String),
}

impl From<SpendingFcnErr> for CtpowerErr {
    fn from(e: SpendingFcnErr) -> CtpowerErr {
        CtpowerErr::SpendingFcn(e)
    }
}
