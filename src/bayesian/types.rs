//----------------------------------------
// bayesian mod types
//----------------------------------------
use crate::bayesian::error::BayesianErr;
use crate::error::CtpowerErr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BayesianMethod {
    #[default]
    ConjugateNormal,
    /// Flat prior; the posterior is the likelihood
    Jeffreys,
    /// Seeded Monte Carlo over the conjugate normal model
    Simulation,
}

impl BayesianMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BayesianMethod::ConjugateNormal => "conjugate_normal",
            BayesianMethod::Jeffreys => "jeffreys",
            BayesianMethod::Simulation => "simulation",
        }
    }
}

impl fmt::Display for BayesianMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BayesianMethod {
    type Err = CtpowerErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "conjugate_normal" | "conjugate" => Ok(BayesianMethod::ConjugateNormal),
            "jeffreys" => Ok(BayesianMethod::Jeffreys),
            "simulation" => Ok(BayesianMethod::Simulation),
            other => Err(BayesianErr::UnknownMethod(other.to_string()).into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorSpecification {
    /// "normal", or "flat" for the Jeffreys prior
    pub distribution: String,
    pub mean: f64,
    /// Infinite for the flat prior
    pub variance: f64,
}

impl PriorSpecification {
    pub fn normal(mean: f64, variance: f64) -> Self {
        PriorSpecification {
            distribution: String::from("normal"),
            mean,
            variance,
        }
    }

    pub fn flat() -> Self {
        PriorSpecification {
            distribution: String::from("flat"),
            mean: 0.0,
            variance: f64::INFINITY,
        }
    }
}

/// Posterior-probability based power of a study with n observations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BayesianPowerResult {
    /// Probability that the posterior clears the decision threshold when
    /// the true effect equals the assumed one
    pub posterior_power: f64,
    /// Posterior credible interval expected at the assumed effect
    pub credible_interval: (f64, f64),
    /// Power averaged over the prior (assurance)
    pub probability_of_success: f64,
    pub posterior_mean: f64,
    pub posterior_sd: f64,
    pub prior_specification: PriorSpecification,
    pub method: BayesianMethod,
    pub sample_size: usize,
    /// None for a plain posterior probability
    pub decision_threshold: Option<f64>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_tags_round_trip() {
        for m in [
            BayesianMethod::ConjugateNormal,
            BayesianMethod::Jeffreys,
            BayesianMethod::Simulation,
        ] {
            assert_eq!(m.as_str().parse::<BayesianMethod>(), Ok(m));
        }
    }

    #[test]
    fn unknown_method_error() {
        if let Err(e) = "empirical".parse::<BayesianMethod>() {
            assert_eq!(
                String::from("while computing Bayesian power: unknown Bayesian method: empirical"),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }
}
