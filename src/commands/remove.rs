//! # Remove Command Implementation
//!
//! This module implements the `remove` subcommand, the inverse of `add`.
//! Org admins are protected and cannot be removed this way.

use anyhow::Result;
use clap::Args;

use korg::membership::{Change, OrgOptions};

use super::{change_membership, OrgArgs};

/// Remove a user from one or more orgs
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// GitHub username to remove
    #[arg(value_name = "USERNAME")]
    pub username: String,

    #[command(flatten)]
    pub org: OrgArgs,

    /// Write the changes and commit them
    #[arg(long)]
    pub confirm: bool,
}

/// Execute the `remove` command.
pub fn execute(args: RemoveArgs) -> Result<()> {
    let options = OrgOptions {
        root: args.org.root,
        orgs: args.org.orgs,
        confirm: args.confirm,
    };
    change_membership(Change::Remove, &args.username, &options)
}
