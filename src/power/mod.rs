//----------------------------------------
// power mod
//----------------------------------------
pub mod calculator;
pub mod error;
pub(crate) mod formulas;
pub mod types;
