//----------------------------------------
// rank tests
//----------------------------------------
use crate::error::CtpowerErr;
use crate::power::formulas::{PowerFormula, normal_power, standardized_difference};
use crate::power::types::PowerDesign;

/// Asymptotic relative efficiency of rank tests against the t test under
/// normality
const RANK_ARE: f64 = 3. / std::f64::consts::PI;

/// Mann-Whitney U: probability of superiority P maps to d = sqrt(2) Phi^-1(P);
/// group sizes are discounted by the ARE before the normal approximation
pub(crate) struct MannWhitney;

/// Wilcoxon signed-rank: P(D > 0) maps to d = Phi^-1(P)
pub(crate) struct WilcoxonSignedRank;

impl PowerFormula for MannWhitney {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr> {
        let z_crit = design.extras.z_crit(design.alpha)?;
        Ok(normal_power(
            mann_whitney_shift(design)?,
            z_crit,
            design.extras.alternative,
        ))
    }

    fn expected_z(&self, design: &PowerDesign) -> Result<Option<f64>, CtpowerErr> {
        mann_whitney_shift(design).map(Some)
    }
}

impl PowerFormula for WilcoxonSignedRank {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr> {
        let z_crit = design.extras.z_crit(design.alpha)?;
        Ok(normal_power(
            signed_rank_shift(design)?,
            z_crit,
            design.extras.alternative,
        ))
    }

    fn expected_z(&self, design: &PowerDesign) -> Result<Option<f64>, CtpowerErr> {
        signed_rank_shift(design).map(Some)
    }
}

fn mann_whitney_shift(design: &PowerDesign) -> Result<f64, CtpowerErr> {
    let d = standardized_difference(design, false)?;
    let n1 = design.group_sizes[0] as f64 * RANK_ARE;
    let n2 = design.group_sizes[1] as f64 * RANK_ARE;
    Ok(d * (n1 * n2 / (n1 + n2)).sqrt())
}

fn signed_rank_shift(design: &PowerDesign) -> Result<f64, CtpowerErr> {
    let d = standardized_difference(design, true)?;
    let n = design.group_sizes[0] as f64 * RANK_ARE;
    Ok(d * n.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::types::{EffectSize, TestExtras, TestType};

    #[test]
    fn mann_whitney_p064() {
        let d = PowerDesign {
            test_type: TestType::MannWhitney,
            group_sizes: vec![30, 30],
            effect_size: EffectSize::probability_of_superiority(0.64),
            alpha: 0.05,
            extras: TestExtras::default(),
        };
        assert!((MannWhitney.power(&d).unwrap() - 0.4836).abs() < 0.001);
    }

    #[test]
    fn wilcoxon_p07() {
        let d = PowerDesign {
            test_type: TestType::WilcoxonSignedRank,
            group_sizes: vec![25],
            effect_size: EffectSize::probability_of_superiority(0.7),
            alpha: 0.05,
            extras: TestExtras::default(),
        };
        assert!((WilcoxonSignedRank.power(&d).unwrap() - 0.7265).abs() < 0.001);
    }

    #[test]
    fn rank_test_weaker_than_t() {
        let mw = MannWhitney
            .power(&PowerDesign {
                test_type: TestType::MannWhitney,
                group_sizes: vec![30, 30],
                effect_size: EffectSize::cohens_d(0.5),
                alpha: 0.05,
                extras: TestExtras::default(),
            })
            .unwrap();
        assert!(mw < 0.4779);
    }
}
