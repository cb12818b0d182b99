//! # Activity Audit
//!
//! Finds org members with little or no recorded activity. Membership comes
//! from the loaded org configs, activity from a [`ContributionSource`], and a
//! CSV of exceptions shields users who should stay regardless. The audit is
//! read-only; it produces a report and never edits configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::OrgConfig;
use crate::defaults::OWNERS_LINK_PREFIX;
use crate::error::Result;
use crate::services::{Contribution, ContributionSource, OwnersLookup};
use crate::teams::walk_teams;

/// Options for one audit run.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// DevStats period code (`y`, `q`, `m`, ...).
    pub period: String,
    /// Users with at most this many contributions are flagged.
    pub activity_threshold: u64,
    pub exceptions_file: Option<PathBuf>,
    pub check_owners: bool,
    pub check_teams: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            period: "y".to_string(),
            activity_threshold: 0,
            exceptions_file: None,
            check_owners: false,
            check_teams: false,
        }
    }
}

/// A user exempt from the audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    pub username: String,
    pub reason: String,
}

/// Read an exceptions CSV. The first row is a header and is skipped.
pub fn read_exceptions(path: &Path) -> Result<Vec<Exception>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut exceptions = Vec::new();
    for record in reader.records() {
        let record = record?;
        let username = record.get(0).unwrap_or_default();
        if username.is_empty() {
            continue;
        }
        exceptions.push(Exception {
            username: username.to_string(),
            reason: record.get(1).unwrap_or_default().to_string(),
        });
    }
    Ok(exceptions)
}

/// One user's memberships and audit findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    /// Login as first seen in the configs.
    pub username: String,
    pub contributions: u64,
    pub orgs: Vec<String>,
    /// Team names per org.
    pub teams: BTreeMap<String, Vec<String>>,
    pub is_owner: bool,
}

/// Gather every user of `orgs`, keyed by lowercased login.
///
/// Org members and admins are recorded under `orgs`; members and maintainers
/// of any team, at any depth, under `teams`.
pub fn collect_users(orgs: &BTreeMap<String, OrgConfig>) -> Result<BTreeMap<String, UserInfo>> {
    let mut users: BTreeMap<String, UserInfo> = BTreeMap::new();

    for (org_name, org) in orgs {
        for login in org.members.iter().chain(&org.admins) {
            let user = entry(&mut users, login);
            if !user.orgs.contains(org_name) {
                user.orgs.push(org_name.clone());
            }
        }

        walk_teams(&org.teams, &mut |_, team_name, team| {
            for login in team.members.iter().chain(&team.maintainers) {
                let teams = entry(&mut users, login)
                    .teams
                    .entry(org_name.clone())
                    .or_default();
                if !teams.iter().any(|t| t == team_name) {
                    teams.push(team_name.to_string());
                }
            }
        })?;
    }

    Ok(users)
}

fn entry<'a>(users: &'a mut BTreeMap<String, UserInfo>, login: &str) -> &'a mut UserInfo {
    users
        .entry(login.to_lowercase())
        .or_insert_with(|| UserInfo {
            username: login.to_string(),
            ..Default::default()
        })
}

/// Users with no recorded activity, or at most `threshold` contributions,
/// that are not listed in `exceptions`. Sorted by username, ignoring case.
pub fn flag_inactive(
    users: &BTreeMap<String, UserInfo>,
    contributions: &BTreeMap<String, Contribution>,
    exceptions: &[Exception],
    threshold: u64,
) -> Vec<UserInfo> {
    let exempt: BTreeSet<String> = exceptions
        .iter()
        .map(|e| e.username.to_lowercase())
        .collect();

    let mut flagged: Vec<UserInfo> = users
        .iter()
        .filter_map(|(key, user)| {
            if exempt.contains(key) {
                info!("username {} in exceptions. skipping...", user.username);
                return None;
            }
            let count = contributions.get(key).map(|c| c.count);
            match count {
                Some(count) if count > threshold => None,
                _ => {
                    debug!(
                        "user below threshold or not in devstats: {} contributions: {}",
                        user.username,
                        count.unwrap_or(0)
                    );
                    Some(UserInfo {
                        contributions: count.unwrap_or(0),
                        ..user.clone()
                    })
                }
            }
        })
        .collect();

    flagged.sort_by_cached_key(|u| u.username.to_lowercase());
    flagged
}

/// Look up owner status for each user.
pub fn annotate_owners(users: &mut [UserInfo], lookup: &dyn OwnersLookup) -> Result<()> {
    for user in users.iter_mut() {
        user.is_owner = lookup.is_owner(&user.username)?;
        debug!("checking if user {} is owner: {}", user.username, user.is_owner);
    }
    Ok(())
}

/// Outcome of [`run_audit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub total_users: usize,
    pub total_contributors: usize,
    pub exceptions: Vec<Exception>,
    pub flagged: Vec<UserInfo>,
}

/// Run the audit over already loaded orgs.
pub fn run_audit(
    orgs: &BTreeMap<String, OrgConfig>,
    options: &AuditOptions,
    source: &dyn ContributionSource,
    owners: &dyn OwnersLookup,
) -> Result<AuditReport> {
    info!(
        "Running analysis with a lookback period of {} and activity threshold of {}",
        options.period, options.activity_threshold
    );

    let exceptions = match &options.exceptions_file {
        Some(path) => {
            info!("reading exceptions from {}", path.display());
            read_exceptions(path)?
        }
        None => Vec::new(),
    };

    info!("fetching contribution data");
    let contributions = source.contributions(&options.period)?;

    let users = collect_users(orgs)?;
    let mut flagged = flag_inactive(
        &users,
        &contributions,
        &exceptions,
        options.activity_threshold,
    );
    if options.check_owners {
        annotate_owners(&mut flagged, owners)?;
    }

    Ok(AuditReport {
        total_users: users.len(),
        total_contributors: contributions.len(),
        exceptions,
        flagged,
    })
}

/// Render flagged users as a pipe-delimited table.
///
/// Columns are `Username | Orgs`, plus `Teams` with `check_teams` and
/// `Owner | Owners Link` with `check_owners`.
pub fn render_report(users: &[UserInfo], options: &AuditOptions) -> String {
    let mut headers = vec!["Username", "Orgs"];
    if options.check_teams {
        headers.push("Teams");
    }
    if options.check_owners {
        headers.extend(["Owner", "Owners Link"]);
    }

    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|user| {
            let mut row = vec![user.username.clone(), user.orgs.join(", ")];
            if options.check_teams {
                let teams: Vec<String> = user
                    .teams
                    .iter()
                    .map(|(org, teams)| format!("{}: {}", org, teams.join(", ")))
                    .collect();
                row.push(teams.join("; "));
            }
            if options.check_owners {
                if user.is_owner {
                    row.push("yes".to_string());
                    row.push(format!("{}{}", OWNERS_LINK_PREFIX, user.username));
                } else {
                    row.push("no".to_string());
                    row.push(String::new());
                }
            }
            row
        })
        .collect();

    render_table(&headers, &rows)
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |cells: Vec<&str>, out: &mut String| {
        for (cell, width) in cells.iter().zip(&widths) {
            let _ = write!(out, "| {:<width$} ", cell, width = width);
        }
        out.push_str("|\n");
    };

    line(headers.to_vec(), &mut out);
    for width in &widths {
        let _ = write!(out, "|{}", "-".repeat(width + 2));
    }
    out.push_str("|\n");
    for row in rows {
        line(row.iter().map(String::as_str).collect(), &mut out);
    }
    out
}
