//! Command implementations

pub mod log;
pub mod watch;
