//! Command-line parsing and results output for the `rblocksim` binary.

pub mod cli;
pub mod error;
pub mod output;

pub use cli::{Cli, ResolvedConfig};
pub use error::CliError;
