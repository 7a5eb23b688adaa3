//! CLI argument definitions using clap
//!
//! Commands:
//! - aggtree compile --program <path> [--config <path>]
//! - aggtree decode --program <path> --response <path> [--config <path>]
//!
//! A path of `-` reads from stdin.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aggtree - SQL statement chains to nested search aggregations
#[derive(Parser, Debug)]
#[command(name = "aggtree")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a statement program into one search request
    Compile {
        /// Path to the program JSON
        #[arg(long)]
        program: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Decode a saved backend response against a program
    Decode {
        /// Path to the program JSON
        #[arg(long)]
        program: PathBuf,

        /// Path to the backend response JSON
        #[arg(long)]
        response: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
