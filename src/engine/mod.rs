//----------------------------------------
// engine mod
//----------------------------------------
mod advice;
pub mod flat;
pub mod statistical_engine;
pub mod types;
