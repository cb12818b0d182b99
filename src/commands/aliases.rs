//! # Aliases Command Implementation
//!
//! This module implements the `aliases` subcommand, which writes an
//! OWNERS_ALIASES file with one alias per team of an org.

use anyhow::Result;
use clap::Args;
use log::info;
use std::fs;
use std::path::PathBuf;

use korg::aliases::{build_aliases, load_source, render};
use korg::defaults::org_config_path;

/// Generate an OWNERS_ALIASES file from an org's teams
#[derive(Args, Debug)]
pub struct AliasesArgs {
    /// Org whose teams become aliases
    #[arg(long, value_name = "ORG", default_value = "kubernetes")]
    pub org: String,

    /// Merged config or org.yaml to read [default: config/<ORG>/org.yaml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// File to write
    #[arg(short, long, value_name = "FILE", default_value = "OWNERS_ALIASES")]
    pub output: PathBuf,
}

/// Execute the `aliases` command.
pub fn execute(args: AliasesArgs) -> Result<()> {
    let config_path = args.config.unwrap_or_else(|| org_config_path(&args.org));
    let org = load_source(&config_path, &args.org)?;
    let aliases = build_aliases(&org)?;

    fs::write(&args.output, render(&aliases)?)?;
    info!("Wrote {}", args.output.display());
    println!(
        "wrote {} aliases to {}",
        aliases.aliases.len(),
        args.output.display()
    );
    Ok(())
}
