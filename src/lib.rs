//----------------------------------------
// Root lib
//----------------------------------------
//! The purpose of this library is to provide the numerical core for planning
//! clinical studies: statistical power and required sample sizes for the
//! common test families, group sequential stopping boundaries with
//! alpha-spending, interim conditional power and sample size re-estimation,
//! and Bayesian posterior-probability power.
//!
//! Callers construct a [`StatisticalPowerEngine`] and invoke it directly;
//! every engine operation returns a structured result and reports problems
//! as warnings instead of errors. The component calculators are public as
//! well, for callers that prefer explicit `Result`s.

/// Adaptive designs: group sequential studies, conditional power and
/// sample size re-estimation
pub mod adaptive;
/// Bayesian posterior power
pub mod bayesian;
/// This module houses the lower-level public API
pub mod compute;
/// Engine configuration
pub mod config;
mod distributions;
/// The engine facade
pub mod engine;
/// This module contains error types
pub mod error;
/// Power for individual test families
pub mod power;
/// Sample size search
pub mod sample_size;
mod sequential;
/// Alpha-spending functions
pub mod spending;
mod util;

pub use crate::adaptive::types::{
    AdaptiveAnalysisResult, ConditionalPowerResult, DesignType, GroupSequentialBoundaries,
    InterimDecision, ReestimationResult,
};
pub use crate::bayesian::types::{BayesianMethod, BayesianPowerResult, PriorSpecification};
pub use crate::config::EngineConfig;
pub use crate::engine::{
    flat::FlatRecord,
    statistical_engine::StatisticalPowerEngine,
    types::{CalculationRecord, PowerAnalysisResult},
};
pub use crate::error::CtpowerErr;
pub use crate::power::types::{
    Alternative, EffectSize, EffectSizeType, SampleSize, TestExtras, TestType,
};
pub use crate::sample_size::types::SampleSizeCalculation;
pub use crate::spending::types::SpendingFcn;
