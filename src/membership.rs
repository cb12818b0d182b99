//! # Membership Mutation
//!
//! Case-insensitive list helpers and the add/remove operations applied to an
//! [`OrgConfig`]. GitHub logins are case-insensitive, so every comparison in
//! this module folds case while the stored entries keep their original
//! spelling.

use std::path::PathBuf;

use log::info;

use crate::config::{self, OrgConfig};
use crate::defaults::{find_invalid_orgs, org_config_path};
use crate::error::{Error, Result};
use crate::git::VersionControl;

/// Canonical form of a GitHub login for comparisons: lowercased, without a
/// leading `@`.
pub fn normalize_login(login: &str) -> String {
    login.trim_start_matches('@').to_lowercase()
}

/// Returns `true` if `list` contains `login`, ignoring case.
pub fn contains_ignore_case(list: &[String], login: &str) -> bool {
    let wanted = normalize_login(login);
    list.iter().any(|entry| normalize_login(entry) == wanted)
}

/// Stable case-insensitive sort; entries equal up to case keep their order.
pub fn sort_ignore_case(list: &mut [String]) {
    list.sort_by_cached_key(|entry| entry.to_lowercase());
}

/// Returns `true` if `list` is already in case-insensitive order.
pub fn is_sorted_ignore_case(list: &[String]) -> bool {
    list.windows(2)
        .all(|pair| pair[0].to_lowercase() <= pair[1].to_lowercase())
}

/// Values that appear more than once in `list`, ignoring case.
///
/// Each duplicate is reported once, in normalized form, sorted.
pub fn duplicates_ignore_case(list: &[String]) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut dups = std::collections::BTreeSet::new();
    for entry in list {
        let normalized = normalize_login(entry);
        if !seen.insert(normalized.clone()) {
            dups.insert(normalized);
        }
    }
    dups.into_iter().collect()
}

/// Add `username` to the org's members, keeping the list sorted.
///
/// Fails with [`Error::AlreadyMember`] if the user is already a member or an
/// admin; `config` is untouched in that case.
pub fn add_member(config: &mut OrgConfig, org: &str, username: &str) -> Result<()> {
    if contains_ignore_case(&config.members, username)
        || contains_ignore_case(&config.admins, username)
    {
        return Err(Error::AlreadyMember {
            username: username.to_string(),
            org: org.to_string(),
        });
    }

    config.members.push(username.to_string());
    sort_ignore_case(&mut config.members);
    Ok(())
}

/// Remove the first case-insensitive match of `username` from the members.
///
/// Admins are protected: an admin yields [`Error::IsAdmin`] even if also
/// listed as a member. A user who is not a member yields
/// [`Error::NotMember`].
pub fn remove_member(config: &mut OrgConfig, org: &str, username: &str) -> Result<()> {
    if contains_ignore_case(&config.admins, username) {
        return Err(Error::IsAdmin {
            username: username.to_string(),
            org: org.to_string(),
        });
    }

    let wanted = normalize_login(username);
    let position = config
        .members
        .iter()
        .position(|member| normalize_login(member) == wanted)
        .ok_or_else(|| Error::NotMember {
            username: username.to_string(),
            org: org.to_string(),
        })?;
    config.members.remove(position);
    Ok(())
}

/// Options shared by the `add` and `remove` commands.
#[derive(Debug, Clone)]
pub struct OrgOptions {
    /// Root of the org repository; configs live at `config/<org>/org.yaml`.
    pub root: PathBuf,
    pub orgs: Vec<String>,
    /// Save and commit. Without it configs are only read and checked.
    pub confirm: bool,
}

impl Default for OrgOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            orgs: Vec::new(),
            confirm: false,
        }
    }
}

/// A membership change applied to every selected org.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Add,
    Remove,
}

impl Change {
    fn apply(self, config: &mut OrgConfig, org: &str, username: &str) -> Result<()> {
        match self {
            Change::Add => add_member(config, org, username),
            Change::Remove => remove_member(config, org, username),
        }
    }

    /// Commit message for the change across `orgs`.
    pub fn commit_message(self, username: &str, orgs: &[String]) -> String {
        match self {
            Change::Add => format!("add {} to {}", username, orgs.join(", ")),
            Change::Remove => format!("remove {} from {}", username, orgs.join(", ")),
        }
    }
}

/// Apply `change` for `username` to each org in `options.orgs`, in order.
///
/// Returns the config paths (relative to the root) that were, or with
/// `confirm` would have been, modified. Orgs are processed one at a time, so
/// a failing org leaves the configs saved before it in place; nothing is
/// committed in that case. `on_org` is called with each org once its change
/// has been applied (and, with `confirm`, saved).
pub fn change_orgs(
    change: Change,
    username: &str,
    options: &OrgOptions,
    vcs: &dyn VersionControl,
    on_org: &mut dyn FnMut(&str),
) -> Result<Vec<PathBuf>> {
    if options.orgs.is_empty() {
        return Err(Error::InvalidArgument {
            message: "please specify at least one org".to_string(),
        });
    }
    let invalid = find_invalid_orgs(&options.orgs);
    if !invalid.is_empty() {
        return Err(Error::InvalidOrgs { orgs: invalid });
    }

    let mut modified = Vec::new();
    for org in &options.orgs {
        let relative = org_config_path(org);
        let path = options.root.join(&relative);
        let mut config = config::from_file(&path)?;
        change.apply(&mut config, org, username)?;

        if options.confirm {
            info!("saving config for {} org", org);
            config::save(&path, &config)?;
        }
        on_org(org);
        modified.push(relative);
    }

    if options.confirm {
        info!("committing changes");
        let message = change.commit_message(username, &options.orgs);
        vcs.commit(&options.root, &modified, &message)?;
    }
    Ok(modified)
}

/// Relative paths for display.
pub fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
