//----------------------------------------
// power mod types
//----------------------------------------
use std::fmt;
use std::str::FromStr;

use crate::error::CtpowerErr;
use crate::power::error::PowerErr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    OneSampleT,
    TwoSampleT,
    PairedT,
    OneSampleProportion,
    TwoSampleProportion,
    OneWayAnova,
    ChiSquareIndependence,
    Correlation,
    MultipleRegression,
    LogRankSurvival,
    MannWhitney,
    WilcoxonSignedRank,
    FisherExact,
}

impl TestType {
    pub const ALL: [TestType; 13] = [
        TestType::OneSampleT,
        TestType::TwoSampleT,
        TestType::PairedT,
        TestType::OneSampleProportion,
        TestType::TwoSampleProportion,
        TestType::OneWayAnova,
        TestType::ChiSquareIndependence,
        TestType::Correlation,
        TestType::MultipleRegression,
        TestType::LogRankSurvival,
        TestType::MannWhitney,
        TestType::WilcoxonSignedRank,
        TestType::FisherExact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::OneSampleT => "one_sample_t",
            TestType::TwoSampleT => "two_sample_t",
            TestType::PairedT => "paired_t",
            TestType::OneSampleProportion => "one_sample_proportion",
            TestType::TwoSampleProportion => "two_sample_proportion",
            TestType::OneWayAnova => "one_way_anova",
            TestType::ChiSquareIndependence => "chi_square_independence",
            TestType::Correlation => "correlation",
            TestType::MultipleRegression => "multiple_regression",
            TestType::LogRankSurvival => "log_rank_survival",
            TestType::MannWhitney => "mann_whitney",
            TestType::WilcoxonSignedRank => "wilcoxon_signed_rank",
            TestType::FisherExact => "fisher_exact",
        }
    }

    /// Effect measure assumed when the caller does not name one
    pub fn default_effect_type(&self) -> EffectSizeType {
        match self {
            TestType::OneSampleT | TestType::TwoSampleT | TestType::PairedT => {
                EffectSizeType::CohensD
            }
            TestType::OneSampleProportion
            | TestType::TwoSampleProportion
            | TestType::FisherExact => EffectSizeType::CohensH,
            TestType::OneWayAnova => EffectSizeType::CohensF,
            TestType::ChiSquareIndependence => EffectSizeType::CohensW,
            TestType::Correlation => EffectSizeType::PearsonR,
            TestType::MultipleRegression => EffectSizeType::RSquared,
            TestType::LogRankSurvival => EffectSizeType::HazardRatio,
            TestType::MannWhitney | TestType::WilcoxonSignedRank => {
                EffectSizeType::ProbabilityOfSuperiority
            }
        }
    }

    /// Smallest group size for which the test statistic is defined
    pub fn min_group_size(&self, extras: &TestExtras) -> usize {
        match self {
            TestType::OneSampleProportion
            | TestType::TwoSampleProportion
            | TestType::ChiSquareIndependence
            | TestType::LogRankSurvival => 1,
            TestType::OneSampleT
            | TestType::TwoSampleT
            | TestType::PairedT
            | TestType::OneWayAnova
            | TestType::MannWhitney
            | TestType::WilcoxonSignedRank
            | TestType::FisherExact => 2,
            TestType::Correlation => 4,
            TestType::MultipleRegression => extras.predictors.unwrap_or(1) + 2,
        }
    }

    /// Number of independent groups the design compares. ANOVA reads its
    /// group count from the extras.
    pub fn n_groups(&self, extras: &TestExtras) -> usize {
        match self {
            TestType::OneSampleT
            | TestType::PairedT
            | TestType::OneSampleProportion
            | TestType::ChiSquareIndependence
            | TestType::Correlation
            | TestType::MultipleRegression
            | TestType::WilcoxonSignedRank => 1,
            TestType::TwoSampleT
            | TestType::TwoSampleProportion
            | TestType::LogRankSurvival
            | TestType::MannWhitney
            | TestType::FisherExact => 2,
            TestType::OneWayAnova => extras.groups.unwrap_or(3),
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = CtpowerErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PowerErr::UnknownTestType(s.to_string()).into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSizeType {
    CohensD,
    CohensF,
    CohensW,
    CohensH,
    HazardRatio,
    PearsonR,
    RSquared,
    ProbabilityOfSuperiority,
}

impl EffectSizeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectSizeType::CohensD => "cohens_d",
            EffectSizeType::CohensF => "cohens_f",
            EffectSizeType::CohensW => "cohens_w",
            EffectSizeType::CohensH => "cohens_h",
            EffectSizeType::HazardRatio => "hazard_ratio",
            EffectSizeType::PearsonR => "pearson_r",
            EffectSizeType::RSquared => "r_squared",
            EffectSizeType::ProbabilityOfSuperiority => "probability_of_superiority",
        }
    }

    /// Magnitude, on this measure's own scale, below which an effect is
    /// conventionally considered smaller than "small"
    pub fn small_effect_threshold(&self) -> f64 {
        match self {
            EffectSizeType::CohensD | EffectSizeType::CohensH => 0.2,
            EffectSizeType::CohensF | EffectSizeType::CohensW | EffectSizeType::PearsonR => 0.1,
            EffectSizeType::RSquared => 0.02,
            EffectSizeType::HazardRatio => 0.1,
            EffectSizeType::ProbabilityOfSuperiority => 0.056,
        }
    }
}

impl fmt::Display for EffectSizeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An effect magnitude tagged with the measure it is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    pub value: f64,
    pub kind: EffectSizeType,
}

impl EffectSize {
    pub fn new(value: f64, kind: EffectSizeType) -> Self {
        EffectSize { value, kind }
    }

    pub fn cohens_d(value: f64) -> Self {
        EffectSize::new(value, EffectSizeType::CohensD)
    }

    pub fn cohens_f(value: f64) -> Self {
        EffectSize::new(value, EffectSizeType::CohensF)
    }

    pub fn cohens_w(value: f64) -> Self {
        EffectSize::new(value, EffectSizeType::CohensW)
    }

    pub fn cohens_h(value: f64) -> Self {
        EffectSize::new(value, EffectSizeType::CohensH)
    }

    pub fn hazard_ratio(value: f64) -> Self {
        EffectSize::new(value, EffectSizeType::HazardRatio)
    }

    pub fn pearson_r(value: f64) -> Self {
        EffectSize::new(value, EffectSizeType::PearsonR)
    }

    pub fn r_squared(value: f64) -> Self {
        EffectSize::new(value, EffectSizeType::RSquared)
    }

    pub fn probability_of_superiority(value: f64) -> Self {
        EffectSize::new(value, EffectSizeType::ProbabilityOfSuperiority)
    }

    /// Checks the magnitude against the domain of its measure
    pub fn validate(&self) -> Result<(), CtpowerErr> {
        let v = self.value;
        let ok = v.is_finite()
            && match self.kind {
                EffectSizeType::CohensD | EffectSizeType::CohensH => true,
                EffectSizeType::CohensF | EffectSizeType::CohensW => v >= 0.0,
                EffectSizeType::HazardRatio => v > 0.0,
                EffectSizeType::PearsonR => v > -1.0 && v < 1.0,
                EffectSizeType::RSquared => (0.0..1.0).contains(&v),
                EffectSizeType::ProbabilityOfSuperiority => v > 0.0 && v < 1.0,
            };
        if ok {
            Ok(())
        } else {
            Err(PowerErr::BadEffectSize {
                kind: self.kind,
                value: v,
            }
            .into())
        }
    }

    /// Distance from "no effect" on the measure's own scale. Hazard ratios
    /// are measured on the log scale, superiority probabilities from 0.5.
    pub fn distance_from_null(&self) -> f64 {
        match self.kind {
            EffectSizeType::HazardRatio => self.value.ln().abs(),
            EffectSizeType::ProbabilityOfSuperiority => (self.value - 0.5).abs(),
            _ => self.value.abs(),
        }
    }
}

/// Group sizes a power calculation is evaluated at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSize {
    /// One-sample designs: the total n. Group designs: the size of the
    /// reference group; other groups follow the allocation ratio.
    PerGroup(usize),
    TwoGroups(usize, usize),
    Groups(Vec<usize>),
}

impl SampleSize {
    /// Expands to explicit group sizes for a test with `n_groups` groups
    pub fn group_sizes(&self, n_groups: usize, allocation_ratio: f64) -> Vec<usize> {
        match self {
            SampleSize::PerGroup(n) => match n_groups {
                0 | 1 => vec![*n],
                2 => vec![*n, allocated(*n, allocation_ratio)],
                k => vec![*n; k],
            },
            SampleSize::TwoGroups(n1, n2) => vec![*n1, *n2],
            SampleSize::Groups(v) => v.clone(),
        }
    }
}

/// Sum of the group sizes, saturating at `usize::MAX`
pub fn total_sample_size(group_sizes: &[usize]) -> usize {
    group_sizes.iter().fold(0, |acc, &n| acc.saturating_add(n))
}

/// Size of the second group for reference size n and ratio n2/n1
pub fn allocated(n: usize, ratio: f64) -> usize {
    ((n as f64) * ratio - 1e-9).ceil().max(1.0) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alternative {
    #[default]
    TwoSided,
    OneSided,
}

/// Test-specific parameters. Every field is optional; formulas fall back to
/// documented defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestExtras {
    /// First proportion; the null proportion for one-sample tests
    pub p1: Option<f64>,
    /// Second proportion; the alternative for one-sample tests
    pub p2: Option<f64>,
    /// Degrees of freedom for chi-square tests
    pub df: Option<usize>,
    /// Number of groups for ANOVA
    pub groups: Option<usize>,
    /// Number of predictors for multiple regression
    pub predictors: Option<usize>,
    /// Probability that a subject contributes an event (log-rank)
    pub event_rate: Option<f64>,
    /// n2 / n1
    pub allocation_ratio: Option<f64>,
    pub alternative: Alternative,
}

impl TestExtras {
    pub fn with_proportions(mut self, p1: f64, p2: f64) -> Self {
        self.p1 = Some(p1);
        self.p2 = Some(p2);
        self
    }

    pub fn with_df(mut self, df: usize) -> Self {
        self.df = Some(df);
        self
    }

    pub fn with_groups(mut self, groups: usize) -> Self {
        self.groups = Some(groups);
        self
    }

    pub fn with_predictors(mut self, predictors: usize) -> Self {
        self.predictors = Some(predictors);
        self
    }

    pub fn with_event_rate(mut self, event_rate: f64) -> Self {
        self.event_rate = Some(event_rate);
        self
    }

    pub fn with_allocation_ratio(mut self, ratio: f64) -> Self {
        self.allocation_ratio = Some(ratio);
        self
    }

    pub fn one_sided(mut self) -> Self {
        self.alternative = Alternative::OneSided;
        self
    }

    pub fn allocation_ratio(&self) -> f64 {
        self.allocation_ratio.unwrap_or(1.0)
    }

    /// Standard normal critical value for this alternative
    pub fn z_crit(&self, alpha: f64) -> Result<f64, CtpowerErr> {
        crate::distributions::std_normal::std_normal_quantile(1.0 - self.tail_alpha(alpha))
    }

    /// Alpha assigned to each rejection tail
    pub fn tail_alpha(&self, alpha: f64) -> f64 {
        match self.alternative {
            Alternative::TwoSided => alpha / 2.0,
            Alternative::OneSided => alpha,
        }
    }
}

/// Everything a power formula needs, validated and expanded
#[derive(Debug, Clone, PartialEq)]
pub struct PowerDesign {
    pub test_type: TestType,
    pub group_sizes: Vec<usize>,
    pub effect_size: EffectSize,
    pub alpha: f64,
    pub extras: TestExtras,
}

impl PowerDesign {
    pub fn total(&self) -> usize {
        total_sample_size(&self.group_sizes)
    }
}

/// One entry of a calculator's diagnostic history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerRecord {
    pub test_type: TestType,
    pub group_sizes: Vec<usize>,
    pub effect_size: f64,
    pub effect_size_type: EffectSizeType,
    pub alpha: f64,
    pub power: f64,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip_tags() {
        for t in TestType::ALL {
            assert_eq!(t.as_str().parse::<TestType>().unwrap(), t);
            assert_eq!(
                serde_json::to_value(t).unwrap(),
                serde_json::Value::String(t.as_str().to_string())
            );
        }
    }

    #[test]
    fn unknown_test_type_error() {
        if let Err(e) = "kruskal_wallis".parse::<TestType>() {
            assert_eq!(
                String::from("while computing power: unsupported test type: kruskal_wallis"),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }

    #[test]
    fn per_group_expansion() {
        assert_eq!(SampleSize::PerGroup(20).group_sizes(1, 1.0), vec![20]);
        assert_eq!(SampleSize::PerGroup(20).group_sizes(2, 1.5), vec![20, 30]);
        assert_eq!(SampleSize::PerGroup(20).group_sizes(2, 1.0), vec![20, 20]);
        assert_eq!(SampleSize::PerGroup(7).group_sizes(4, 1.0), vec![7; 4]);
    }

    #[test]
    fn effect_domains() {
        assert!(EffectSize::hazard_ratio(0.0).validate().is_err());
        assert!(EffectSize::pearson_r(1.0).validate().is_err());
        assert!(EffectSize::probability_of_superiority(0.5).validate().is_ok());
        assert!(EffectSize::cohens_d(f64::NAN).validate().is_err());
        assert!(EffectSize::cohens_d(-0.4).validate().is_ok());
    }

    #[test]
    fn distance_from_null_uses_log_hazard() {
        let hr = EffectSize::hazard_ratio(0.5);
        assert!((hr.distance_from_null() - 2_f64.ln()).abs() < 1e-12);
        let ps = EffectSize::probability_of_superiority(0.3);
        assert!((ps.distance_from_null() - 0.2).abs() < 1e-12);
    }
}
