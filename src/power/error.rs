//----------------------------------------
// power errors
//----------------------------------------
use crate::error::CtpowerErr;
use crate::power::types::{EffectSizeType, TestType};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PowerErr {
    #[error("unsupported test type: {0}")]
    UnknownTestType(String),
    #[error("alpha should be in (0, 1); got {0}")]
    BadAlpha(f64),
    #[error("{test_type} needs at least {minimum} subjects per group; got {got}")]
    SampleSizeTooSmall {
        test_type: TestType,
        minimum: usize,
        got: usize,
    },
    #[error("group sizes {got:?} for {test_type} overflow the total sample size")]
    SampleSizeTooLarge { test_type: TestType, got: Vec<usize> },
    #[error("{test_type} expects {expected} group sizes; got {got}")]
    WrongGroupCount {
        test_type: TestType,
        expected: usize,
        got: usize,
    },
    #[error("effect size {value} is not a valid {kind}")]
    BadEffectSize { kind: EffectSizeType, value: f64 },
    #[error("effect size type {kind} is not supported for {test_type}")]
    UnsupportedEffectType {
        test_type: TestType,
        kind: EffectSizeType,
    },
    #[error("{test_type} requires {name}")]
    MissingExtra {
        test_type: TestType,
        name: &'static str,
    },
    #[error("invalid {name} for {test_type}: {value}")]
    BadExtra {
        test_type: TestType,
        name: &'static str,
        value: f64,
    },
}

impl From<PowerErr> for CtpowerErr {
    fn from(e: PowerErr) -> CtpowerErr {
        CtpowerErr::Power(e)
    }
}
