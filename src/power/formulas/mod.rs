//----------------------------------------
// power formulas mod
//----------------------------------------
mod association;
mod proportions;
mod rank;
mod survival;
mod variance;

pub(crate) use proportions::cohens_h_from;

use crate::distributions::std_normal::std_normal_cdf;
use crate::error::CtpowerErr;
use crate::power::error::PowerErr;
use crate::power::types::{Alternative, EffectSizeType, PowerDesign, TestType};

/// Power of a single test family at a fully specified design
pub(crate) trait PowerFormula: Sync {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr>;

    /// Mean of the approximately normal test statistic under the
    /// alternative. None for tests whose statistic is not a single z.
    fn expected_z(&self, _design: &PowerDesign) -> Result<Option<f64>, CtpowerErr> {
        Ok(None)
    }
}

/// Maps a test type to the formula that computes its power
pub(crate) fn strategy_for(test_type: TestType) -> &'static dyn PowerFormula {
    match test_type {
        TestType::OneSampleT | TestType::PairedT => &t_tests::OneSampleT,
        TestType::TwoSampleT => &t_tests::TwoSampleT,
        TestType::OneSampleProportion => &proportions::OneSampleProportion,
        TestType::TwoSampleProportion => &proportions::TwoSampleProportion,
        TestType::FisherExact => &proportions::FisherExact,
        TestType::OneWayAnova => &variance::OneWayAnova,
        TestType::ChiSquareIndependence => &variance::ChiSquareIndependence,
        TestType::MultipleRegression => &variance::MultipleRegression,
        TestType::Correlation => &association::Correlation,
        TestType::LogRankSurvival => &survival::LogRank,
        TestType::MannWhitney => &rank::MannWhitney,
        TestType::WilcoxonSignedRank => &rank::WilcoxonSignedRank,
    }
}

/// Power of a z test whose statistic is N(shift, 1) under the alternative
pub(crate) fn normal_power(shift: f64, z_crit: f64, alternative: Alternative) -> f64 {
    let shift = shift.abs();
    let upper = std_normal_cdf(shift - z_crit);
    let power = match alternative {
        Alternative::TwoSided => upper + std_normal_cdf(-shift - z_crit),
        Alternative::OneSided => upper,
    };
    power.clamp(0.0, 1.0)
}

/// Standardized mean difference for designs that accept it either as
/// Cohen's d or as a probability of superiority. `paired` selects the
/// one-sample conversion P = Phi(d) over the two-sample P = Phi(d / sqrt 2).
pub(crate) fn standardized_difference(
    design: &PowerDesign,
    paired: bool,
) -> Result<f64, CtpowerErr> {
    let effect = design.effect_size;
    match effect.kind {
        EffectSizeType::CohensD => Ok(effect.value),
        EffectSizeType::ProbabilityOfSuperiority => {
            let z = crate::distributions::std_normal::std_normal_quantile(effect.value)?;
            Ok(if paired { z } else { std::f64::consts::SQRT_2 * z })
        }
        kind => Err(unsupported(design.test_type, kind)),
    }
}

pub(crate) fn unsupported(test_type: TestType, kind: EffectSizeType) -> CtpowerErr {
    PowerErr::UnsupportedEffectType { test_type, kind }.into()
}

pub(crate) fn proportion(
    test_type: TestType,
    name: &'static str,
    value: Option<f64>,
) -> Result<Option<f64>, CtpowerErr> {
    match value {
        Some(p) if !(p > 0.0 && p < 1.0) => Err(PowerErr::BadExtra {
            test_type,
            name,
            value: p,
        }
        .into()),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_power_at_zero_shift_is_alpha() {
        let z = 1.959964;
        assert!((normal_power(0.0, z, Alternative::TwoSided) - 0.05).abs() < 1e-6);
        assert!((normal_power(0.0, 1.644854, Alternative::OneSided) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn normal_power_symmetric_in_shift() {
        let z = 1.959964;
        assert_eq!(
            normal_power(-2.1, z, Alternative::TwoSided),
            normal_power(2.1, z, Alternative::TwoSided)
        );
    }

    #[test]
    fn every_test_type_has_a_strategy() {
        for t in TestType::ALL {
            // Only checks that dispatch is total
            let _ = strategy_for(t);
        }
    }
}
