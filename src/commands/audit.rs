//! # Audit Command Implementation
//!
//! This module implements the `audit` subcommand, which lists org members
//! whose contribution count over a lookback period is at or below a
//! threshold. The report is written to `--output-file` as a pipe table.
//!
//! The command is read-only. It needs network access to the contribution
//! statistics service and, with `--check-owners`, to the code search service.

use anyhow::Result;
use clap::Args;
use std::fs;
use std::path::PathBuf;

use korg::audit::{render_report, run_audit, AuditOptions};
use korg::defaults::{find_invalid_orgs, VALID_ORGS};
use korg::error::Error;
use korg::loader::load_orgs;
use korg::services::{CodeSearchClient, DevStatsClient};

use super::OrgArgs;

/// Audit GitHub org members
#[derive(Args, Debug)]
pub struct AuditArgs {
    #[command(flatten)]
    pub org: OrgArgs,

    /// Minimum activity to be considered active
    #[arg(long, value_name = "N", default_value_t = 0, allow_negative_numbers = true)]
    pub activity_threshold: i64,

    /// Period to look back for activity, as a DevStats period code (y = year)
    #[arg(long, value_name = "PERIOD", default_value = "y")]
    pub period: String,

    /// File the report is written to
    #[arg(long, value_name = "FILE")]
    pub output_file: PathBuf,

    /// CSV of users to leave out of the report (columns: username, reason)
    #[arg(long, value_name = "FILE")]
    pub exceptions_file: Option<PathBuf>,

    /// Check whether flagged users are listed in OWNERS files
    #[arg(long)]
    pub check_owners: bool,

    /// Include the teams each flagged user belongs to
    #[arg(long)]
    pub check_teams: bool,
}

/// Execute the `audit` command.
pub fn execute(args: AuditArgs) -> Result<()> {
    let orgs: Vec<String> = if args.org.orgs.is_empty() {
        VALID_ORGS.iter().map(|o| o.to_string()).collect()
    } else {
        args.org.orgs.clone()
    };
    let invalid = find_invalid_orgs(&orgs);
    if !invalid.is_empty() {
        return Err(Error::InvalidOrgs { orgs: invalid }.into());
    }
    let activity_threshold = u64::try_from(args.activity_threshold).map_err(|_| {
        Error::InvalidArgument {
            message: "activity threshold cannot be negative".to_string(),
        }
    })?;

    let options = AuditOptions {
        period: args.period,
        activity_threshold,
        exceptions_file: args.exceptions_file,
        check_owners: args.check_owners,
        check_teams: args.check_teams,
    };

    println!("fetching org members");
    let configs = load_orgs(&args.org.root, &orgs)?;
    let report = run_audit(
        &configs,
        &options,
        &DevStatsClient::default(),
        &CodeSearchClient::default(),
    )?;

    if options.exceptions_file.is_some() {
        println!("Total Exceptions: {}", report.exceptions.len());
        for exception in &report.exceptions {
            println!("  {}: {}", exception.username, exception.reason);
        }
    }
    println!("total contributors: {}", report.total_contributors);
    println!("Total \"Org Members\": {}", report.total_users);
    println!(
        "Total \"Org Members\" below threshold after exceptions: {}",
        report.flagged.len()
    );

    fs::write(&args.output_file, render_report(&report.flagged, &options))?;
    println!("report written to {}", args.output_file.display());
    Ok(())
}
