//! Command implementations

pub mod exec;
pub mod fleet;
pub mod serve;
pub mod status;
