//----------------------------------------
// sequential errors
//----------------------------------------
use crate::error::CtpowerErr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrialBoundsError {
    #[error(
        "failed to converge at look {look} (computed alpha: {computed}, target alpha: {target}, tolerance: {tol})"
    )]
    FailedToConverge {
        look: usize,
        computed: f64,
        target: f64,
        tol: f64,
    },
}

impl From<TrialBoundsError> for CtpowerErr {
    fn from(e: TrialBoundsError) -> CtpowerErr {
        CtpowerErr::TrialBounds(e)
    }
}
