//! vbvid CLI library.
//!
//! Argument parsing, log-file naming and the run command live here so they
//! can be tested without spawning the binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{Cli, parse_cli, parse_cli_from};
pub use commands::{RunOutcome, build_core_config, run_command};
pub use error::{CliErrorContext, CliResult};
