//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// korg - Manage the membership config of Kubernetes community GitHub orgs
#[derive(Parser, Debug)]
#[command(name = "korg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a user to one or more orgs
    Add(commands::add::AddArgs),

    /// Remove a user from one or more orgs
    Remove(commands::remove::RemoveArgs),

    /// Report org members with little or no recent activity
    Audit(commands::audit::AuditArgs),

    /// Remove a list of users from every config file below a directory
    RemoveMembers(commands::remove_members::RemoveMembersArgs),

    /// Merge per-org configs into a single config
    Merge(commands::merge::MergeArgs),

    /// Generate an OWNERS_ALIASES file from an org's teams
    Aliases(commands::aliases::AliasesArgs),

    /// Check that teams only reference the repositories they are allowed to
    Restrictions(commands::restrictions::RestrictionsArgs),

    /// Check the consistency rules of every org config
    Validate(commands::validate::ValidateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Add(args) => commands::add::execute(args),
            Commands::Remove(args) => commands::remove::execute(args),
            Commands::Audit(args) => commands::audit::execute(args),
            Commands::RemoveMembers(args) => commands::remove_members::execute(args),
            Commands::Merge(args) => commands::merge::execute(args),
            Commands::Aliases(args) => commands::aliases::execute(args),
            Commands::Restrictions(args) => commands::restrictions::execute(args),
            Commands::Validate(args) => commands::validate::execute(args),
        }
    }
}

/// Initialise `env_logger` at `level`; `RUST_LOG` takes precedence.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
