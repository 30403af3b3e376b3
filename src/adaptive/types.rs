//----------------------------------------
// adaptive mod types
//----------------------------------------
use crate::adaptive::error::AdaptiveErr;
use crate::error::CtpowerErr;
use crate::power::types::TestType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignType {
    GroupSequential,
    SampleSizeReestimation,
}

impl DesignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesignType::GroupSequential => "group_sequential",
            DesignType::SampleSizeReestimation => "sample_size_reestimation",
        }
    }
}

impl fmt::Display for DesignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DesignType {
    type Err = CtpowerErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "group_sequential" => Ok(DesignType::GroupSequential),
            "sample_size_reestimation" => Ok(DesignType::SampleSizeReestimation),
            other => Err(AdaptiveErr::UnknownDesignType(other.to_string()).into()),
        }
    }
}

/// Symmetric two-sided boundaries on the z scale, one entry per look
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSequentialBoundaries {
    pub information_fractions: Vec<f64>,
    pub efficacy_boundaries: Vec<f64>,
    pub futility_boundaries: Vec<f64>,
    /// Two-sided alpha spent up to and including each look
    pub cumulative_alpha_spent: Vec<f64>,
    pub incremental_alpha: Vec<f64>,
    /// Probability under the null of crossing any boundary, recomputed
    /// from the boundaries themselves
    pub total_alpha_spent: f64,
    pub spending_function: String,
    pub warnings: Vec<String>,
}

/// Sample sizes are per group for multi-group tests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdaptiveAnalysisResult {
    pub design_type: DesignType,
    pub test_type: TestType,
    pub initial_sample_size: usize,
    pub maximum_sample_size: usize,
    pub fixed_sample_size: usize,
    pub inflation_factor: f64,
    pub interim_analyses: Vec<f64>,
    pub efficacy_boundaries: Vec<f64>,
    pub futility_boundaries: Vec<f64>,
    pub alpha_spending_function: String,
    pub type_i_error_control: bool,
    pub cumulative_alpha: Vec<f64>,
    pub expected_sample_size: f64,
    /// Probability of stopping at each look under the design alternative;
    /// the final look absorbs everything that did not stop earlier
    pub stopping_probabilities: Vec<f64>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterimDecision {
    Continue,
    StopForEfficacy,
    ConsiderFutilityStop,
}

impl InterimDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterimDecision::Continue => "continue",
            InterimDecision::StopForEfficacy => "stop_for_efficacy",
            InterimDecision::ConsiderFutilityStop => "consider_futility_stop",
        }
    }
}

impl fmt::Display for InterimDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalPowerResult {
    pub test_type: TestType,
    pub conditional_power: f64,
    pub information_fraction: f64,
    pub interim_z: f64,
    /// Final-analysis critical value z_{1 - alpha/2}
    pub critical_value: f64,
    /// O'Brien-Fleming type efficacy bound at the interim fraction
    pub efficacy_boundary: f64,
    pub decision: InterimDecision,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReestimationResult {
    pub original_sample_size: usize,
    pub reestimated_sample_size: usize,
    pub variance_ratio: f64,
    /// reestimated / original after clamping
    pub multiplier: f64,
    pub clamped: bool,
    pub target_power: f64,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_type_tags() {
        for d in [DesignType::GroupSequential, DesignType::SampleSizeReestimation] {
            assert_eq!(d.as_str().parse::<DesignType>(), Ok(d));
            assert_eq!(
                serde_json::to_value(d).unwrap(),
                serde_json::Value::String(d.as_str().to_string())
            );
        }
    }

    #[test]
    fn unknown_design_type_error() {
        if let Err(e) = "bayesian_adaptive".parse::<DesignType>() {
            assert_eq!(
                String::from(
                    "while computing adaptive design: unknown design type: bayesian_adaptive"
                ),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }

    #[test]
    fn decision_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&InterimDecision::ConsiderFutilityStop).unwrap(),
            "\"consider_futility_stop\""
        );
    }
}
