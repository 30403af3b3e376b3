//----------------------------------------
// engine mod types
//----------------------------------------
use crate::power::types::{EffectSizeType, TestType};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerAnalysisResult {
    pub test_type: TestType,
    pub power: f64,
    pub alpha: f64,
    pub effect_size: f64,
    pub effect_size_type: EffectSizeType,
    pub sample_size_total: usize,
    pub sample_size_per_group: Vec<usize>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

/// One entry of the engine's append-only history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRecord {
    pub operation: &'static str,
    pub success: bool,
    pub summary: String,
}
