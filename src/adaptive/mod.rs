//----------------------------------------
// adaptive mod
//----------------------------------------
pub mod calculator;
pub mod error;
pub mod types;
