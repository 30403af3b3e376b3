//----------------------------------------
// proportion tests
//----------------------------------------
use crate::distributions::std_normal::std_normal_cdf;
use crate::error::CtpowerErr;
use crate::power::error::PowerErr;
use crate::power::formulas::{PowerFormula, normal_power, proportion, unsupported};
use crate::power::types::{Alternative, EffectSizeType, PowerDesign};

/// Binomial test of p against a null proportion, normal approximation
pub(crate) struct OneSampleProportion;

/// Difference of two independent proportions, normal approximation
pub(crate) struct TwoSampleProportion;

/// Fisher's exact test approximated by the continuity-corrected normal
/// test, which tracks the exact test closely for small 2x2 tables
pub(crate) struct FisherExact;

impl PowerFormula for OneSampleProportion {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr> {
        let n = design.group_sizes[0] as f64;
        let z_crit = design.extras.z_crit(design.alpha)?;

        match proportion_pair(design)? {
            Some((p0, pa)) => {
                let diff = (pa - p0).abs();
                let sd_null = (p0 * (1. - p0)).sqrt();
                let sd_alt = (pa * (1. - pa)).sqrt();
                let upper = std_normal_cdf((diff * n.sqrt() - z_crit * sd_null) / sd_alt);
                let power = match design.extras.alternative {
                    Alternative::TwoSided => {
                        upper + std_normal_cdf((-diff * n.sqrt() - z_crit * sd_null) / sd_alt)
                    }
                    Alternative::OneSided => upper,
                };
                Ok(power.clamp(0., 1.))
            }
            None => {
                let h = cohens_h(design)?;
                Ok(normal_power(h * n.sqrt(), z_crit, design.extras.alternative))
            }
        }
    }

    fn expected_z(&self, design: &PowerDesign) -> Result<Option<f64>, CtpowerErr> {
        let n = design.group_sizes[0] as f64;
        let h = match proportion_pair(design)? {
            Some((p0, pa)) => cohens_h_from(pa, p0),
            None => cohens_h(design)?,
        };
        Ok(Some(h * n.sqrt()))
    }
}

impl PowerFormula for TwoSampleProportion {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr> {
        two_proportion_power(design, false)
    }

    fn expected_z(&self, design: &PowerDesign) -> Result<Option<f64>, CtpowerErr> {
        two_proportion_z(design).map(Some)
    }
}

impl PowerFormula for FisherExact {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr> {
        if proportion_pair(design)?.is_none() {
            return Err(PowerErr::MissingExtra {
                test_type: design.test_type,
                name: "p1 and p2",
            }
            .into());
        }
        two_proportion_power(design, true)
    }

    fn expected_z(&self, design: &PowerDesign) -> Result<Option<f64>, CtpowerErr> {
        two_proportion_z(design).map(Some)
    }
}

fn two_proportion_power(design: &PowerDesign, continuity: bool) -> Result<f64, CtpowerErr> {
    let n1 = design.group_sizes[0] as f64;
    let n2 = design.group_sizes[1] as f64;
    let z_crit = design.extras.z_crit(design.alpha)?;

    match proportion_pair(design)? {
        Some((p1, p2)) => {
            let diff = (p1 - p2).abs();
            let p_bar = (n1 * p1 + n2 * p2) / (n1 + n2);
            let se_null = (p_bar * (1. - p_bar) * (1. / n1 + 1. / n2)).sqrt();
            let se_alt = (p1 * (1. - p1) / n1 + p2 * (1. - p2) / n2).sqrt();
            let correction = if continuity {
                0.5 * (1. / n1 + 1. / n2)
            } else {
                0.
            };
            let upper = std_normal_cdf((diff - correction - z_crit * se_null) / se_alt);
            let power = match design.extras.alternative {
                Alternative::TwoSided => {
                    upper + std_normal_cdf((-diff - correction - z_crit * se_null) / se_alt)
                }
                Alternative::OneSided => upper,
            };
            Ok(power.clamp(0., 1.))
        }
        None => {
            let h = cohens_h(design)?;
            let n_eff = n1 * n2 / (n1 + n2);
            Ok(normal_power(
                h * n_eff.sqrt(),
                z_crit,
                design.extras.alternative,
            ))
        }
    }
}

// Arcsine-scale shift, h sqrt(n1 n2 / (n1 + n2))
fn two_proportion_z(design: &PowerDesign) -> Result<f64, CtpowerErr> {
    let n1 = design.group_sizes[0] as f64;
    let n2 = design.group_sizes[1] as f64;
    let h = match proportion_pair(design)? {
        Some((p1, p2)) => cohens_h_from(p1, p2),
        None => cohens_h(design)?,
    };
    Ok(h * (n1 * n2 / (n1 + n2)).sqrt())
}

// Both proportions, or neither; one alone is ambiguous
fn proportion_pair(design: &PowerDesign) -> Result<Option<(f64, f64)>, CtpowerErr> {
    let p1 = proportion(design.test_type, "p1", design.extras.p1)?;
    let p2 = proportion(design.test_type, "p2", design.extras.p2)?;
    match (p1, p2) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        (None, None) => Ok(None),
        (None, Some(_)) => Err(PowerErr::MissingExtra {
            test_type: design.test_type,
            name: "p1",
        }
        .into()),
        (Some(_), None) => Err(PowerErr::MissingExtra {
            test_type: design.test_type,
            name: "p2",
        }
        .into()),
    }
}

fn cohens_h(design: &PowerDesign) -> Result<f64, CtpowerErr> {
    match design.effect_size.kind {
        EffectSizeType::CohensH => Ok(design.effect_size.value),
        kind => Err(unsupported(design.test_type, kind)),
    }
}

/// Cohen's h between two proportions
pub(crate) fn cohens_h_from(p1: f64, p2: f64) -> f64 {
    2. * p1.sqrt().asin() - 2. * p2.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::types::{EffectSize, TestExtras, TestType};

    fn design(test_type: TestType, sizes: Vec<usize>, extras: TestExtras) -> PowerDesign {
        PowerDesign {
            test_type,
            group_sizes: sizes,
            effect_size: EffectSize::cohens_h(0.0),
            alpha: 0.05,
            extras,
        }
    }

    #[test]
    fn one_sample_null_vs_alternative() {
        let d = design(
            TestType::OneSampleProportion,
            vec![50],
            TestExtras::default().with_proportions(0.5, 0.65),
        );
        let p = OneSampleProportion.power(&d).unwrap();
        assert!((p - 0.5672).abs() < 0.001);
    }

    #[test]
    fn two_sample_proportions() {
        let d = design(
            TestType::TwoSampleProportion,
            vec![100, 100],
            TestExtras::default().with_proportions(0.65, 0.45),
        );
        let p = TwoSampleProportion.power(&d).unwrap();
        assert!((p - 0.8162).abs() < 0.001);
    }

    #[test]
    fn two_sample_cohens_h() {
        let mut d = design(TestType::TwoSampleProportion, vec![100, 100], TestExtras::default());
        d.effect_size = EffectSize::cohens_h(cohens_h_from(0.65, 0.45));
        let p = TwoSampleProportion.power(&d).unwrap();
        assert!((p - 0.8167).abs() < 0.001);
    }

    #[test]
    fn fisher_is_conservative() {
        let extras = TestExtras::default().with_proportions(0.8, 0.4);
        let fisher = FisherExact
            .power(&design(TestType::FisherExact, vec![20, 20], extras.clone()))
            .unwrap();
        let plain = TwoSampleProportion
            .power(&design(TestType::TwoSampleProportion, vec![20, 20], extras))
            .unwrap();
        assert!((fisher - 0.6285).abs() < 0.001);
        assert!(fisher < plain);
    }

    #[test]
    fn fisher_needs_proportions() {
        if let Err(e) = FisherExact.power(&design(
            TestType::FisherExact,
            vec![20, 20],
            TestExtras::default(),
        )) {
            assert_eq!(
                String::from("while computing power: fisher_exact requires p1 and p2"),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }

    #[test]
    fn proportion_out_of_range() {
        let d = design(
            TestType::TwoSampleProportion,
            vec![10, 10],
            TestExtras::default().with_proportions(1.2, 0.4),
        );
        assert!(TwoSampleProportion.power(&d).is_err());
    }
}
