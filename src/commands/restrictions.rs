//! # Restrictions Command Implementation
//!
//! This module implements the `restrictions` subcommand, which checks that
//! every team of each given org only references repositories its config
//! path is allowed to.
//!
//! Every org is checked even after one fails; the command fails at the end
//! if any org had violations.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use korg::error::Error;
use korg::loader::OrgPart;
use korg::restrictions::{check_org, compile, load};

/// Check that teams only reference the repositories they are allowed to
#[derive(Args, Debug)]
pub struct RestrictionsArgs {
    /// Restrictions config file
    #[arg(long, value_name = "FILE")]
    pub restrictions: PathBuf,

    /// Orgs to check, as org-name=path/to/org.yaml
    #[arg(long = "orgs", value_name = "NAME=PATH", required = true, num_args = 1..)]
    pub orgs: Vec<OrgPart>,
}

/// Execute the `restrictions` command.
pub fn execute(args: RestrictionsArgs) -> Result<()> {
    let restrictions = compile(&load(&args.restrictions)?)?;

    let mut failed = Vec::new();
    for part in &args.orgs {
        match check_org(&restrictions, &part.name, &part.path) {
            Ok(()) => println!("{}: ok", part.name),
            Err(e @ Error::Restriction { .. }) => {
                eprintln!("{}", e);
                failed.push(part.name.clone());
            }
            Err(e) => return Err(e.into()),
        }
    }

    if !failed.is_empty() {
        bail!("restriction violations in orgs: {}", failed.join(", "));
    }
    Ok(())
}
