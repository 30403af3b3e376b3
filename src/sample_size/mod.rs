//----------------------------------------
// sample size mod
//----------------------------------------
pub mod error;
pub mod solver;
pub mod types;
