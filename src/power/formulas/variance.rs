//----------------------------------------
// F and chi-square tests
//----------------------------------------
use crate::distributions::critical::{chi_squared_quantile, f_quantile};
use crate::distributions::noncentral::{noncentral_chi_squared_cdf, noncentral_f_cdf};
use crate::error::CtpowerErr;
use crate::power::error::PowerErr;
use crate::power::formulas::{PowerFormula, unsupported};
use crate::power::types::{EffectSizeType, PowerDesign};

/// One-way ANOVA: lambda = f^2 N, df = (k - 1, N - k)
pub(crate) struct OneWayAnova;

/// Chi-square test of independence / goodness of fit: lambda = w^2 N
pub(crate) struct ChiSquareIndependence;

/// Overall F test of a multiple regression: lambda = f^2 N,
/// df = (predictors, N - predictors - 1)
pub(crate) struct MultipleRegression;

impl PowerFormula for OneWayAnova {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr> {
        let f = match design.effect_size.kind {
            EffectSizeType::CohensF => design.effect_size.value,
            kind => return Err(unsupported(design.test_type, kind)),
        };
        let k = design.group_sizes.len() as f64;
        let n_total = design.total() as f64;
        noncentral_f_power(f * f * n_total, k - 1., n_total - k, design.alpha)
    }
}

impl PowerFormula for ChiSquareIndependence {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr> {
        let w = match design.effect_size.kind {
            EffectSizeType::CohensW => design.effect_size.value,
            kind => return Err(unsupported(design.test_type, kind)),
        };
        let df = match design.extras.df {
            Some(0) => {
                return Err(PowerErr::BadExtra {
                    test_type: design.test_type,
                    name: "df",
                    value: 0.,
                }
                .into());
            }
            Some(df) => df as f64,
            None => 1.,
        };
        let n_total = design.total() as f64;
        let crit = chi_squared_quantile(1. - design.alpha, df)?;
        let power = 1. - noncentral_chi_squared_cdf(crit, df, w * w * n_total)?;
        Ok(power.clamp(0., 1.))
    }
}

impl PowerFormula for MultipleRegression {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr> {
        let f2 = match design.effect_size.kind {
            EffectSizeType::RSquared => {
                let r2 = design.effect_size.value;
                r2 / (1. - r2)
            }
            EffectSizeType::CohensF => design.effect_size.value.powi(2),
            kind => return Err(unsupported(design.test_type, kind)),
        };
        let predictors = match design.extras.predictors {
            Some(0) => {
                return Err(PowerErr::BadExtra {
                    test_type: design.test_type,
                    name: "predictors",
                    value: 0.,
                }
                .into());
            }
            Some(p) => p as f64,
            None => 1.,
        };
        let n_total = design.total() as f64;
        noncentral_f_power(
            f2 * n_total,
            predictors,
            n_total - predictors - 1.,
            design.alpha,
        )
    }
}

fn noncentral_f_power(ncp: f64, df1: f64, df2: f64, alpha: f64) -> Result<f64, CtpowerErr> {
    let crit = f_quantile(1. - alpha, df1, df2)?;
    let power = 1. - noncentral_f_cdf(crit, df1, df2, ncp)?;
    Ok(power.clamp(0., 1.))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::types::{EffectSize, TestExtras, TestType};

    fn design(
        test_type: TestType,
        sizes: Vec<usize>,
        effect: EffectSize,
        extras: TestExtras,
    ) -> PowerDesign {
        PowerDesign {
            test_type,
            group_sizes: sizes,
            effect_size: effect,
            alpha: 0.05,
            extras,
        }
    }

    #[test]
    fn anova_four_groups() {
        let d = design(
            TestType::OneWayAnova,
            vec![30; 4],
            EffectSize::cohens_f(0.25),
            TestExtras::default().with_groups(4),
        );
        assert!((OneWayAnova.power(&d).unwrap() - 0.6065).abs() < 0.002);
    }

    #[test]
    fn anova_three_groups() {
        let d = design(
            TestType::OneWayAnova,
            vec![20; 3],
            EffectSize::cohens_f(0.25),
            TestExtras::default(),
        );
        let p = OneWayAnova.power(&d).unwrap();
        assert!((p - 0.3744).abs() < 0.002);
    }

    #[test]
    fn chi_square_w_03() {
        let d = design(
            TestType::ChiSquareIndependence,
            vec![100],
            EffectSize::cohens_w(0.3),
            TestExtras::default(),
        );
        assert!((ChiSquareIndependence.power(&d).unwrap() - 0.8508).abs() < 0.001);
    }

    #[test]
    fn chi_square_more_df_less_power() {
        let one = ChiSquareIndependence
            .power(&design(
                TestType::ChiSquareIndependence,
                vec![100],
                EffectSize::cohens_w(0.3),
                TestExtras::default(),
            ))
            .unwrap();
        let four = ChiSquareIndependence
            .power(&design(
                TestType::ChiSquareIndependence,
                vec![100],
                EffectSize::cohens_w(0.3),
                TestExtras::default().with_df(4),
            ))
            .unwrap();
        assert!((four - 0.6635).abs() < 0.002);
        assert!(four < one);
    }

    #[test]
    fn regression_r_squared() {
        let d = design(
            TestType::MultipleRegression,
            vec![80],
            EffectSize::r_squared(0.13),
            TestExtras::default().with_predictors(3),
        );
        assert!((MultipleRegression.power(&d).unwrap() - 0.8174).abs() < 0.002);
    }

    #[test]
    fn anova_rejects_cohens_d() {
        let d = design(
            TestType::OneWayAnova,
            vec![20; 3],
            EffectSize::cohens_d(0.5),
            TestExtras::default(),
        );
        if let Err(e) = OneWayAnova.power(&d) {
            assert_eq!(
                String::from(
                    "while computing power: effect size type cohens_d is not \
                    supported for one_way_anova"
                ),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }
}
