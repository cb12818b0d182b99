//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `korg`
//! command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, builds the options
//!   value for the library operation, and prints the outcome.
//!
//! Flags shared by several commands are grouped in [`OrgArgs`] and flattened
//! into each command that needs them.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use korg::git::Git;
use korg::membership::{change_orgs, display_paths, Change, OrgOptions};

pub mod add;
pub mod aliases;
pub mod audit;
pub mod merge;
pub mod remove;
pub mod remove_members;
pub mod restrictions;
pub mod validate;

/// Repository root and org selection.
#[derive(Args, Debug, Clone)]
pub struct OrgArgs {
    /// Root of the org repository.
    #[arg(long, value_name = "DIR", env = "KORG_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Orgs to operate on. Repeat the flag or separate names with commas.
    #[arg(long = "org", value_name = "ORG", value_delimiter = ',')]
    pub orgs: Vec<String>,
}

/// Apply an `add` or `remove` to every selected org and report each org as it
/// is done, so a later failure still shows which orgs were already changed.
pub(crate) fn change_membership(change: Change, username: &str, options: &OrgOptions) -> Result<()> {
    if !options.confirm {
        println!("!!! running in dry-run mode. pass --confirm to persist changes.");
    }

    let modified = change_orgs(change, username, options, &Git, &mut |org| match change {
        Change::Add => println!("adding {} to {} org", username, org),
        Change::Remove => println!("removing {} from {} org", username, org),
    })?;
    println!("config files modified: {}", display_paths(&modified));
    if options.confirm {
        println!("committed: {}", change.commit_message(username, &options.orgs));
    }
    Ok(())
}
