//! # Merge Command Implementation
//!
//! This module implements the `merge` subcommand, which combines per-org
//! config files into a single `orgs:` document and prints it (or writes it to
//! `--output`).

use anyhow::Result;
use clap::Args;
use std::fs;
use std::path::PathBuf;

use korg::loader::{merge_orgs, MergeOptions, OrgPart, TeamsMode};

/// Merge per-org configs into a single config
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Each instance adds an org-name=path/to/org.yaml part
    #[arg(long = "org-part", value_name = "NAME=PATH")]
    pub org_parts: Vec<OrgPart>,

    /// Extra org-name=path/to/org.yaml parts
    #[arg(value_name = "NAME=PATH")]
    pub extra_parts: Vec<OrgPart>,

    /// Merge the teams.yaml files in the subdirectories beside each org.yaml
    #[arg(long, conflicts_with = "ignore_teams")]
    pub merge_teams: bool,

    /// Drop all teams from the output
    #[arg(long)]
    pub ignore_teams: bool,

    /// Write the merged config here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `merge` command.
pub fn execute(args: MergeArgs) -> Result<()> {
    let teams = if args.merge_teams {
        TeamsMode::Merge
    } else if args.ignore_teams {
        TeamsMode::Ignore
    } else {
        TeamsMode::Keep
    };
    let options = MergeOptions {
        parts: args.org_parts.into_iter().chain(args.extra_parts).collect(),
        teams,
    };

    let merged = merge_orgs(&options)?;
    let yaml = serde_yaml::to_string(&merged)?;
    match args.output {
        Some(path) => fs::write(path, yaml)?,
        None => print!("{}", yaml),
    }
    Ok(())
}
