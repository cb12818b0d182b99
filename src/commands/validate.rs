//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which runs the
//! consistency rules over every org under `<root>/config` (or only the orgs
//! named with `--org`) and prints each violation.
//!
//! All configs are loaded strictly, so an unknown key fails the run before any
//! rule is checked. This command is read-only.

use anyhow::{bail, Result};
use clap::Args;

use korg::defaults::{MIN_APPROVERS, REQUIRED_ADMIN};
use korg::validate::{validate_corpus, ValidationOptions};

use super::OrgArgs;

/// Check the consistency rules of every org config
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub org: OrgArgs,

    /// Account that must be an admin of every org (repeatable)
    #[arg(long = "required-admin", value_name = "LOGIN", default_values_t = [REQUIRED_ADMIN.to_string()])]
    pub required_admins: Vec<String>,

    /// Minimum number of approvers in each org's OWNERS file
    #[arg(long, value_name = "N", default_value_t = MIN_APPROVERS)]
    pub min_approvers: usize,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs) -> Result<()> {
    let options = ValidationOptions {
        required_admins: args.required_admins,
        min_approvers: args.min_approvers,
    };
    let config_dir = args.org.root.join("config");
    let report = validate_corpus(&config_dir, &args.org.orgs, &options)?;

    let mut total = 0;
    for (org, violations) in &report {
        if violations.is_empty() {
            println!("{}: ok", org);
            continue;
        }
        println!("{}: {} violation(s)", org, violations.len());
        for violation in violations {
            println!("  {}", violation);
        }
        total += violations.len();
    }

    if total > 0 {
        bail!("{} violation(s) found", total);
    }
    Ok(())
}
