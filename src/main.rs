//! # korg CLI
//!
//! This is the binary entry point for the `korg` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Turning any error into a non-zero exit status.
//!
//! The core application logic lives in the `korg` library crate, so the binary
//! stays a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
