pub mod diagnose;
pub mod env;
