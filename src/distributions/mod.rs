//----------------------------------------
// distributions mod
//----------------------------------------
pub mod critical;
pub mod error;
pub mod noncentral;
pub mod std_normal;
