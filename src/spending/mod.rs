//----------------------------------------
// spending mod
//----------------------------------------
pub mod error;
pub mod spending_fcns;
pub mod types;
