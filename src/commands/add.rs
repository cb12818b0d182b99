//! # Add Command Implementation
//!
//! This module implements the `add` subcommand, which adds a GitHub user to
//! the member list of one or more orgs.
//!
//! Without `--confirm` the configs are read and checked but nothing is
//! written. With it, each `config/<org>/org.yaml` is saved (keeping its file
//! mode) and the changes are committed in a single commit.

use anyhow::Result;
use clap::Args;

use korg::membership::{Change, OrgOptions};

use super::{change_membership, OrgArgs};

/// Add a user to one or more orgs
#[derive(Args, Debug)]
pub struct AddArgs {
    /// GitHub username to add
    #[arg(value_name = "USERNAME")]
    pub username: String,

    #[command(flatten)]
    pub org: OrgArgs,

    /// Write the changes and commit them
    #[arg(long)]
    pub confirm: bool,
}

/// Execute the `add` command.
pub fn execute(args: AddArgs) -> Result<()> {
    let options = OrgOptions {
        root: args.org.root,
        orgs: args.org.orgs,
        confirm: args.confirm,
    };
    change_membership(Change::Add, &args.username, &options)
}
