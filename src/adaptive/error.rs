//----------------------------------------
// adaptive errors
//----------------------------------------
use crate::error::CtpowerErr;
use crate::power::types::TestType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdaptiveErr {
    #[error("{operation} is not available for {test_type}")]
    UnsupportedTest {
        test_type: TestType,
        operation: &'static str,
    },
    #[error("unknown design type: {0}")]
    UnknownDesignType(String),
    #[error("interim sample size should be in [1, {final_n}); got {interim}")]
    BadInterimSizes { interim: usize, final_n: usize },
    #[error("{name} should be positive and finite; got {value}")]
    BadVariance { name: &'static str, value: f64 },
    #[error("original sample size should be at least 1")]
    BadOriginalSize,
    #[error("interim effect should be finite; got {0}")]
    BadInterimEffect(f64),
}

impl From<AdaptiveErr> for CtpowerErr {
    fn from(e: AdaptiveErr) -> CtpowerErr {
        CtpowerErr::Adaptive(e)
    }
}
