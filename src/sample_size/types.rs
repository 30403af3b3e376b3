//----------------------------------------
// sample size mod types
//----------------------------------------
use crate::power::types::{EffectSizeType, TestType};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSizeCalculation {
    pub test_type: TestType,
    /// Size of the reference group; the total n for one-sample designs
    pub required_sample_size: usize,
    pub power_achieved: f64,
    pub target_power: f64,
    pub alpha: f64,
    pub effect_size: f64,
    pub effect_size_type: EffectSizeType,
    pub sample_size_per_group: Vec<usize>,
    pub sample_size_total: usize,
    pub total_groups: usize,
    pub allocation_ratio: f64,
    pub convergence_achieved: bool,
    pub iterations: usize,
    /// (n, power) pairs ordered by n
    pub power_curve_points: Vec<(usize, f64)>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}
