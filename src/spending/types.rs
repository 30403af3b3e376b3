//----------------------------------------
// spending mod types
//----------------------------------------
use crate::error::CtpowerErr;
use crate::spending::error::SpendingFcnErr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Alpha spending functions. All of them spend the per-side alpha; the
/// two-sided designs built on them spend the same amount on each side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingFcn {
    /// Lan-DeMets O'Brien-Fleming type
    #[default]
    #[serde(rename = "obrien_fleming")]
    OBrienFleming,
    /// Lan-DeMets Pocock type
    Pocock,
    /// Hwang-Shih-DeCani family with shape gamma; gamma = 0 spends linearly
    HwangShihDeCani(f64),
    /// Cumulative fraction of alpha spent at each look, ending at 1
    Custom { cumulative_spend: Vec<f64> },
}

impl SpendingFcn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingFcn::OBrienFleming => "obrien_fleming",
            SpendingFcn::Pocock => "pocock",
            SpendingFcn::HwangShihDeCani(_) => "hwang_shih_decani",
            SpendingFcn::Custom { .. } => "custom",
        }
    }
}

impl fmt::Display for SpendingFcn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpendingFcn::HwangShihDeCani(gamma) => write!(f, "hwang_shih_decani({gamma})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Parses the parameter-free tags plus `hwang_shih_decani(<gamma>)`.
/// Custom spending carries a vector and has to be built directly.
impl FromStr for SpendingFcn {
    type Err = CtpowerErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "obrien_fleming" | "o_brien_fleming" => return Ok(SpendingFcn::OBrienFleming),
            "pocock" => return Ok(SpendingFcn::Pocock),
            "hwang_shih_decani" => return Ok(SpendingFcn::HwangShihDeCani(-4.0)),
            _ => {}
        }
        s.strip_prefix("hwang_shih_decani(")
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(|gamma| gamma.trim().parse::<f64>().ok())
            .filter(|gamma| gamma.is_finite())
            .map(SpendingFcn::HwangShihDeCani)
            .ok_or_else(|| SpendingFcnErr::UnknownSpendingFcn(s.to_string()).into())
    }
}
