//----------------------------------------
// sequential mod
//----------------------------------------
pub mod boundaries;
pub mod error;
pub(crate) mod exit_probability;
mod quadrature;
pub(crate) mod types;
