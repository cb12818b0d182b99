//! # Remove-Members Command Implementation
//!
//! This module implements the `remove-members` subcommand, which removes every
//! user named in a file from all org and team configs below a directory.
//!
//! For each user it prints the orgs and teams the user was found in and how
//! many entries named them. With `--confirm` the files are rewritten and one
//! commit per user is created; otherwise the commit message is only printed.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use korg::git::Git;
use korg::removal::{read_member_list, remove_members, RemovalOptions};

/// Remove a list of users from every config file below a directory
#[derive(Args, Debug)]
pub struct RemoveMembersArgs {
    /// File with one username per line (blank lines and `#` comments ignored)
    #[arg(value_name = "MEMBER_FILE")]
    pub member_file: PathBuf,

    /// Config directory (or subdirectory) to search for *.yaml files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Rewrite the files and commit once per removed user
    #[arg(long, conflicts_with = "dryrun")]
    pub confirm: bool,

    /// Only report what would change (the default)
    #[arg(long)]
    pub dryrun: bool,
}

/// Execute the `remove-members` command.
pub fn execute(args: RemoveMembersArgs) -> Result<()> {
    let members = read_member_list(&args.member_file)?;
    let options = RemovalOptions {
        path: args.path,
        confirm: args.confirm && !args.dryrun,
    };

    for removal in remove_members(&members, &options, &Git)? {
        println!("{}", removal);
        if let Some(message) = removal.commit_message() {
            let verb = if options.confirm { "Committed" } else { "Commit message" };
            println!("{}: {:?}", verb, message);
        }
        println!();
    }
    Ok(())
}
