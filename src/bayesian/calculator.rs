//----------------------------------------
// Bayesian power calculator
//----------------------------------------
use crate::bayesian::error::BayesianErr;
use crate::bayesian::types::{BayesianMethod, BayesianPowerResult, PriorSpecification};
use crate::config::BayesianConfig;
use crate::distributions::std_normal::{std_normal_quantile, std_normal_sf};
use crate::error::CtpowerErr;
use rand::{SeedableRng, distributions::Distribution, rngs};
use statrs::distribution::Normal;
use statrs::statistics::Statistics;
use tracing::debug;

// Priors this wide carry almost no information
const VAGUE_PRIOR_VARIANCE: f64 = 100.;

/// Standardized normal model: the effect estimate after n observations is
/// N(theta, 1 / n), and a study succeeds when P(theta > 0 | data) exceeds
/// the decision threshold
#[derive(Debug, Clone, Default)]
pub struct BayesianPowerCalculator {
    config: BayesianConfig,
}

/// Normal prior or posterior on theta
#[derive(Debug, Clone, Copy)]
struct NormalBelief {
    mean: f64,
    variance: f64,
}

impl NormalBelief {
    fn update(&self, estimate: f64, estimate_variance: f64) -> NormalBelief {
        let precision = 1. / self.variance + 1. / estimate_variance;
        NormalBelief {
            mean: (self.mean / self.variance + estimate / estimate_variance) / precision,
            variance: 1. / precision,
        }
    }

    fn prob_above(&self, x: f64) -> f64 {
        std_normal_sf((x - self.mean) / self.variance.sqrt())
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<(), CtpowerErr> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BayesianErr::NotFinite { name, value }.into())
    }
}

fn check_prior_variance(prior_variance: f64) -> Result<(), CtpowerErr> {
    if prior_variance > 0.0 && prior_variance.is_finite() {
        Ok(())
    } else {
        Err(BayesianErr::BadPriorVariance(prior_variance).into())
    }
}

impl BayesianPowerCalculator {
    pub fn new(config: BayesianConfig) -> Self {
        BayesianPowerCalculator { config }
    }

    fn credible_interval(&self, posterior: NormalBelief) -> Result<(f64, f64), CtpowerErr> {
        let z = -std_normal_quantile((1. - self.config.credible_level) / 2.)?;
        let half_width = z * posterior.variance.sqrt();
        Ok((posterior.mean - half_width, posterior.mean + half_width))
    }

    /// Power of a study with `n` observations when the true standardized
    /// effect is `effect_size`. The prior is ignored by the Jeffreys method.
    pub fn bayesian_power(
        &self,
        n: usize,
        effect_size: f64,
        prior_mean: f64,
        prior_variance: f64,
        decision_threshold: f64,
        method: BayesianMethod,
    ) -> Result<BayesianPowerResult, CtpowerErr> {
        //----------------------------------------
        // Check arguments
        if n == 0 {
            return Err(BayesianErr::BadSampleSize.into());
        }
        if !(decision_threshold > 0.0 && decision_threshold < 1.0) {
            return Err(BayesianErr::BadThreshold(decision_threshold).into());
        }
        check_finite("effect size", effect_size)?;
        check_finite("prior mean", prior_mean)?;
        if method != BayesianMethod::Jeffreys {
            check_prior_variance(prior_variance)?;
        }

        let n_f = n as f64;
        let z_gamma = -std_normal_quantile(1. - decision_threshold)?;

        //----------------------------------------
        // Power
        let (prior_specification, posterior, posterior_power, probability_of_success) =
            match method {
                BayesianMethod::Jeffreys => {
                    // Flat prior: P(theta > 0 | est) = Phi(est sqrt(n))
                    let c = z_gamma / n_f.sqrt();
                    let power = std_normal_sf((c - effect_size) * n_f.sqrt());
                    let posterior = NormalBelief {
                        mean: effect_size,
                        variance: 1. / n_f,
                    };
                    (PriorSpecification::flat(), posterior, power, power)
                }
                BayesianMethod::ConjugateNormal | BayesianMethod::Simulation => {
                    let prior = NormalBelief {
                        mean: prior_mean,
                        variance: prior_variance,
                    };
                    let posterior = prior.update(effect_size, 1. / n_f);
                    let (power, assurance) = if method == BayesianMethod::Simulation {
                        self.simulate(n_f, effect_size, prior, decision_threshold)?
                    } else {
                        // Success iff the estimate exceeds c
                        let v_post = 1. / (1. / prior_variance + n_f);
                        let c = (z_gamma / v_post.sqrt() - prior_mean / prior_variance) / n_f;
                        let power = std_normal_sf((c - effect_size) * n_f.sqrt());
                        let assurance =
                            std_normal_sf((c - prior_mean) / (prior_variance + 1. / n_f).sqrt());
                        (power, assurance)
                    };
                    (
                        PriorSpecification::normal(prior_mean, prior_variance),
                        posterior,
                        power,
                        assurance,
                    )
                }
            };
        debug!(
            n,
            effect_size,
            method = %method,
            posterior_power,
            probability_of_success,
            "computed Bayesian power"
        );

        //----------------------------------------
        // Advice
        let mut warnings = vec![];
        if method != BayesianMethod::Jeffreys && prior_variance > VAGUE_PRIOR_VARIANCE {
            warnings.push(String::from(
                "prior is nearly flat; the jeffreys method gives almost the same answer",
            ));
        }
        if method != BayesianMethod::Jeffreys
            && (posterior_power - probability_of_success).abs() > 0.3
        {
            warnings.push(format!(
                "assumed effect and prior disagree: power {posterior_power:.3} against \
                 assurance {probability_of_success:.3}"
            ));
        }
        if method == BayesianMethod::Simulation {
            let se = (posterior_power * (1. - posterior_power) / self.config.simulations as f64)
                .sqrt();
            warnings.push(format!(
                "Monte Carlo estimate from {} draws (standard error {se:.4})",
                self.config.simulations
            ));
        }

        Ok(BayesianPowerResult {
            posterior_power: posterior_power.clamp(0., 1.),
            credible_interval: self.credible_interval(posterior)?,
            probability_of_success: probability_of_success.clamp(0., 1.),
            posterior_mean: posterior.mean,
            posterior_sd: posterior.variance.sqrt(),
            prior_specification,
            method,
            sample_size: n,
            decision_threshold: Some(decision_threshold),
            warnings,
        })
    }

    // Monte Carlo estimates of power at the assumed effect and of assurance
    fn simulate(
        &self,
        n: f64,
        effect_size: f64,
        prior: NormalBelief,
        decision_threshold: f64,
    ) -> Result<(f64, f64), CtpowerErr> {
        let sims = self.config.simulations;
        if sims == 0 {
            return Err(BayesianErr::NoSimulations.into());
        }
        let std_normal =
            Normal::new(0.0, 1.0).map_err(|_| BayesianErr::BadPriorVariance(prior.variance))?;
        let se = (1. / n).sqrt();
        let succeeds = |estimate: f64| prior.update(estimate, 1. / n).prob_above(0.0) > decision_threshold;

        let power_rng = rngs::StdRng::seed_from_u64(self.config.seed);
        let power_hits = std_normal
            .sample_iter(power_rng)
            .take(sims)
            .filter(|&z| succeeds(effect_size + se * z))
            .count();

        let theta_rng = rngs::StdRng::seed_from_u64(self.config.seed.wrapping_add(1));
        let estimate_rng = rngs::StdRng::seed_from_u64(self.config.seed.wrapping_add(2));
        let prior_sd = prior.variance.sqrt();
        let assurance_hits = std_normal
            .sample_iter(theta_rng)
            .zip(std_normal.sample_iter(estimate_rng))
            .take(sims)
            .filter(|&(z_theta, z_est)| succeeds(prior.mean + prior_sd * z_theta + se * z_est))
            .count();

        Ok((
            power_hits as f64 / sims as f64,
            assurance_hits as f64 / sims as f64,
        ))
    }

    /// P(theta > null_value | data) after a conjugate update of a normal
    /// prior with the sample mean of the observations, whose variance is
    /// estimated from the data
    pub fn posterior_probability(
        &self,
        observed_data: &[f64],
        null_value: f64,
        prior_mean: f64,
        prior_variance: f64,
    ) -> Result<BayesianPowerResult, CtpowerErr> {
        //----------------------------------------
        // Check arguments
        let finite: Vec<f64> = observed_data.iter().copied().filter(|x| x.is_finite()).collect();
        if finite.len() < 2 {
            return Err(BayesianErr::InsufficientData(finite.len()).into());
        }
        check_finite("null value", null_value)?;
        check_finite("prior mean", prior_mean)?;
        check_prior_variance(prior_variance)?;

        let n = finite.len();
        let mean = finite.iter().mean();
        let variance = finite.iter().variance();
        if !(variance > 0.0) {
            return Err(BayesianErr::ZeroVariance.into());
        }

        //----------------------------------------
        // Update
        let prior = NormalBelief {
            mean: prior_mean,
            variance: prior_variance,
        };
        let posterior = prior.update(mean, variance / n as f64);
        let prob = posterior.prob_above(null_value);
        debug!(n, mean, variance, prob, "computed posterior probability");

        let mut warnings = vec![];
        if finite.len() < observed_data.len() {
            warnings.push(format!(
                "ignored {} non-finite observations",
                observed_data.len() - finite.len()
            ));
        }
        if n < 10 {
            warnings.push(String::from(
                "fewer than 10 observations; the variance estimate is imprecise",
            ));
        }

        Ok(BayesianPowerResult {
            posterior_power: prob,
            credible_interval: self.credible_interval(posterior)?,
            probability_of_success: prob,
            posterior_mean: posterior.mean,
            posterior_sd: posterior.variance.sqrt(),
            prior_specification: PriorSpecification::normal(prior_mean, prior_variance),
            method: BayesianMethod::ConjugateNormal,
            sample_size: n,
            decision_threshold: None,
            warnings,
        })
    }
}
