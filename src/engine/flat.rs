//----------------------------------------
// Flat field mapping
//----------------------------------------
use crate::adaptive::types::{
    AdaptiveAnalysisResult, ConditionalPowerResult, GroupSequentialBoundaries, ReestimationResult,
};
use crate::bayesian::types::BayesianPowerResult;
use crate::engine::types::{CalculationRecord, PowerAnalysisResult};
use crate::sample_size::types::SampleSizeCalculation;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Conversion of a result into a field-name to primitive mapping. Nested
/// objects are flattened with dotted keys; sequences stay as arrays and
/// enum tags appear as their snake_case strings.
pub trait FlatRecord: Serialize {
    fn to_flat_map(&self) -> BTreeMap<String, Value> {
        let mut out = BTreeMap::new();
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => flatten_into(&mut out, None, fields),
            Ok(other) => {
                out.insert(String::from("value"), other);
            }
            Err(e) => {
                out.insert(String::from("serialization_error"), Value::String(e.to_string()));
            }
        }
        out
    }
}

fn flatten_into(out: &mut BTreeMap<String, Value>, prefix: Option<&str>, fields: Map<String, Value>) {
    for (key, value) in fields {
        let key = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key,
        };
        match value {
            Value::Object(inner) => flatten_into(out, Some(&key), inner),
            leaf => {
                out.insert(key, leaf);
            }
        }
    }
}

impl FlatRecord for PowerAnalysisResult {}
impl FlatRecord for SampleSizeCalculation {}
impl FlatRecord for GroupSequentialBoundaries {}
impl FlatRecord for AdaptiveAnalysisResult {}
impl FlatRecord for ConditionalPowerResult {}
impl FlatRecord for ReestimationResult {}
impl FlatRecord for BayesianPowerResult {}
impl FlatRecord for CalculationRecord {}
