//! Filefilter CLI library
//!
//! Pieces of the `filefilter` binary that are worth testing on their own:
//! - History queries shared by the `log` subcommand and the interactive reader
//! - Parsing of interactive commands
//! - Diagnostics setup
//! - Terminal output helpers

pub mod logging;
pub mod query;
pub mod repl;
pub mod util;
