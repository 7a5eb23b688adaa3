//! CLI module for aggtree
//!
//! Provides command-line interface for:
//! - compile: Print the aggregation request a program compiles to
//! - decode: Decode a saved backend response into rows

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{compile, decode, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_json, write_error, write_response};
