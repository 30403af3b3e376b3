//----------------------------------------
// Engine configuration
//----------------------------------------
use crate::error::CtpowerErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigErr {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("{field} should be in {range}; got {value}")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f64,
    },
}

impl From<ConfigErr> for CtpowerErr {
    fn from(e: ConfigErr) -> CtpowerErr {
        CtpowerErr::Config(e)
    }
}

/// Tunables for every calculator the engine owns. All sections fall back
/// to their defaults when missing from a parsed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_alpha: f64,
    pub solver: SolverConfig,
    pub sequential: SequentialConfig,
    pub reestimation: ReestimationConfig,
    pub bayesian: BayesianConfig,
    pub advice: AdviceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Hard cap on power evaluations during the bisection
    pub max_iterations: usize,
    /// Upper search bound used when the caller gives none
    pub max_sample_size: usize,
    /// Number of (n, power) pairs in the power curve
    pub curve_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequentialConfig {
    /// Quadrature size r; each look uses up to 12r - 3 grid points
    pub quadrature_points: usize,
    /// How close each look's exit probability must be to its alpha increment
    pub boundary_tolerance: f64,
    /// Allowed gap between total alpha spent and nominal alpha
    pub alpha_tolerance: f64,
    pub max_bisection_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReestimationConfig {
    pub min_multiplier: f64,
    pub max_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesianConfig {
    pub credible_level: f64,
    pub simulations: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    pub small_sample_threshold: usize,
    pub low_power_threshold: f64,
    pub high_power_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_alpha: 0.05,
            solver: SolverConfig::default(),
            sequential: SequentialConfig::default(),
            reestimation: ReestimationConfig::default(),
            bayesian: BayesianConfig::default(),
            advice: AdviceConfig::default(),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_iterations: 100,
            max_sample_size: 100_000,
            curve_points: 10,
        }
    }
}

impl Default for SequentialConfig {
    fn default() -> Self {
        SequentialConfig {
            quadrature_points: 32,
            boundary_tolerance: 1e-7,
            alpha_tolerance: 1e-3,
            max_bisection_steps: 200,
        }
    }
}

impl Default for ReestimationConfig {
    fn default() -> Self {
        ReestimationConfig {
            min_multiplier: 0.5,
            max_multiplier: 3.0,
        }
    }
}

impl Default for BayesianConfig {
    fn default() -> Self {
        BayesianConfig {
            credible_level: 0.95,
            simulations: 20_000,
            seed: 24601,
        }
    }
}

impl Default for AdviceConfig {
    fn default() -> Self {
        AdviceConfig {
            small_sample_threshold: 30,
            low_power_threshold: 0.8,
            high_power_threshold: 0.99,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON document and validates the result
    pub fn from_json_str(s: &str) -> Result<Self, CtpowerErr> {
        let config: EngineConfig =
            serde_json::from_str(s).map_err(|e| ConfigErr::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CtpowerErr> {
        fn check(
            field: &'static str,
            range: &'static str,
            value: f64,
            ok: bool,
        ) -> Result<(), CtpowerErr> {
            if ok {
                Ok(())
            } else {
                Err(ConfigErr::OutOfRange {
                    field,
                    range,
                    value,
                }
                .into())
            }
        }

        let a = self.default_alpha;
        check("default_alpha", "(0, 1)", a, a > 0.0 && a < 1.0)?;

        let s = &self.solver;
        check(
            "solver.max_iterations",
            "[1, inf)",
            s.max_iterations as f64,
            s.max_iterations >= 1,
        )?;
        check(
            "solver.max_sample_size",
            "[2, inf)",
            s.max_sample_size as f64,
            s.max_sample_size >= 2,
        )?;
        check(
            "solver.curve_points",
            "[5, inf)",
            s.curve_points as f64,
            s.curve_points >= 5,
        )?;

        let q = &self.sequential;
        check(
            "sequential.quadrature_points",
            "[2, inf)",
            q.quadrature_points as f64,
            q.quadrature_points >= 2,
        )?;
        check(
            "sequential.boundary_tolerance",
            "(0, 1e-3]",
            q.boundary_tolerance,
            q.boundary_tolerance > 0.0 && q.boundary_tolerance <= 1e-3,
        )?;
        check(
            "sequential.alpha_tolerance",
            "(0, 0.1)",
            q.alpha_tolerance,
            q.alpha_tolerance > 0.0 && q.alpha_tolerance < 0.1,
        )?;
        check(
            "sequential.max_bisection_steps",
            "[10, inf)",
            q.max_bisection_steps as f64,
            q.max_bisection_steps >= 10,
        )?;

        let r = &self.reestimation;
        check(
            "reestimation.min_multiplier",
            "(0, 1]",
            r.min_multiplier,
            r.min_multiplier > 0.0 && r.min_multiplier <= 1.0,
        )?;
        check(
            "reestimation.max_multiplier",
            "[1, inf)",
            r.max_multiplier,
            r.max_multiplier >= 1.0 && r.max_multiplier.is_finite(),
        )?;

        let b = &self.bayesian;
        check(
            "bayesian.credible_level",
            "(0, 1)",
            b.credible_level,
            b.credible_level > 0.0 && b.credible_level < 1.0,
        )?;
        check(
            "bayesian.simulations",
            "[100, inf)",
            b.simulations as f64,
            b.simulations >= 100,
        )?;

        let adv = &self.advice;
        check(
            "advice.low_power_threshold",
            "(0, 1)",
            adv.low_power_threshold,
            adv.low_power_threshold > 0.0 && adv.low_power_threshold < 1.0,
        )?;
        check(
            "advice.high_power_threshold",
            "(low_power_threshold, 1]",
            adv.high_power_threshold,
            adv.high_power_threshold > adv.low_power_threshold
                && adv.high_power_threshold <= 1.0,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"solver": {"max_iterations": 40}}"#)
            .expect("failed to parse partial configuration");
        assert_eq!(config.solver.max_iterations, 40);
        assert_eq!(config.solver.max_sample_size, 100_000);
        assert_eq!(config.sequential.quadrature_points, 32);
        assert_eq!(config.default_alpha, 0.05);
    }

    #[test]
    fn bad_alpha_error() {
        if let Err(e) = EngineConfig::from_json_str(r#"{"default_alpha": 1.5}"#) {
            assert_eq!(
                String::from(
                    "while loading configuration: default_alpha should be in (0, 1); got 1.5"
                ),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }

    #[test]
    fn malformed_json_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{not json"),
            Err(CtpowerErr::Config(ConfigErr::Parse(_)))
        ));
    }
}
