//! # Team Tree Traversal
//!
//! Recursive walks over an organization's team tree. Teams own their
//! children, so a top-down walk visits every node exactly once; the depth
//! guard only protects against absurdly deep (hand-written) configs.
//!
//! Three traversals live here:
//!
//! - [`expand_teams`]: flatten each team's membership with that of all its
//!   descendants, used to generate aliases.
//! - [`walk_teams`]: visit every team with its dotted path, used by the
//!   validator, the audit and the restriction checks.
//! - [`find_removal_sites`]: locate every list a user appears in, used by
//!   bulk removal.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::config::{OrgConfig, Team};
use crate::defaults::MAX_TEAM_DEPTH;
use crate::error::{Error, Result};
use crate::membership::normalize_login;

/// A team with the union of its own and all its descendants' members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedTeam {
    pub name: String,
    pub members: BTreeSet<String>,
}

/// Flatten a team tree.
///
/// Returns one entry per node (not just leaves), each holding the team's
/// members and maintainers plus those of every descendant. Entries are in
/// pre-order with siblings sorted by name.
pub fn expand_teams(teams: &BTreeMap<String, Team>) -> Result<Vec<ExpandedTeam>> {
    let mut out = Vec::new();
    expand_into(teams, 0, &mut out)?;
    Ok(out)
}

fn expand_into(
    teams: &BTreeMap<String, Team>,
    depth: usize,
    out: &mut Vec<ExpandedTeam>,
) -> Result<()> {
    for (name, team) in teams {
        check_depth(name, depth)?;

        let index = out.len();
        out.push(ExpandedTeam {
            name: name.clone(),
            members: team
                .members
                .iter()
                .chain(team.maintainers.iter())
                .cloned()
                .collect(),
        });
        expand_into(&team.children, depth + 1, out)?;

        let descendants: BTreeSet<String> = out[index + 1..]
            .iter()
            .flat_map(|t| t.members.iter().cloned())
            .collect();
        out[index].members.extend(descendants);
    }
    Ok(())
}

/// Alias name for a team: lowercase, with every character outside `[a-z0-9]`
/// replaced by `-`.
pub fn normalize_alias_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '-',
        })
        .collect()
}

/// Visit every team in the tree, parents before children.
///
/// The callback receives the team's dotted path (`parent.child`), its own
/// name and the team itself.
pub fn walk_teams<F>(teams: &BTreeMap<String, Team>, visit: &mut F) -> Result<()>
where
    F: FnMut(&str, &str, &Team),
{
    walk_at(teams, "", 0, visit)
}

fn walk_at<F>(teams: &BTreeMap<String, Team>, prefix: &str, depth: usize, visit: &mut F) -> Result<()>
where
    F: FnMut(&str, &str, &Team),
{
    for (name, team) in teams {
        check_depth(name, depth)?;
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        visit(&path, name, team);
        walk_at(&team.children, &path, depth + 1, visit)?;
    }
    Ok(())
}

fn check_depth(team: &str, depth: usize) -> Result<()> {
    if depth >= MAX_TEAM_DEPTH {
        return Err(Error::TeamDepth {
            team: team.to_string(),
            max_depth: MAX_TEAM_DEPTH,
        });
    }
    Ok(())
}

/// Where a removal site lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Org,
    Team,
}

/// Which list of the scope holds the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member,
    Admin,
    Maintainer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Member => write!(f, "member"),
            Role::Admin => write!(f, "admin"),
            Role::Maintainer => write!(f, "maintainer"),
        }
    }
}

/// A single list entry naming the user being removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalSite {
    pub scope: Scope,
    /// Org name for org sites, team name for team sites.
    pub scope_name: String,
    pub role: Role,
}

/// Every place a user appears in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSites {
    /// Sites in the org's `members`/`admins`.
    pub org: Vec<RemovalSite>,
    /// Sites in team `members`/`maintainers`, at any depth.
    pub team: Vec<RemovalSite>,
}

impl RemovalSites {
    pub fn total(&self) -> usize {
        self.org.len() + self.team.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Find every org- and team-level list in `doc` that contains `username`.
///
/// Matching ignores case. Every team is visited, including the descendants
/// of teams the user is not part of.
pub fn find_removal_sites(doc: &OrgConfig, org_name: &str, username: &str) -> Result<RemovalSites> {
    let wanted = normalize_login(username);
    let mut sites = RemovalSites::default();

    let org_lists = [(&doc.members, Role::Member), (&doc.admins, Role::Admin)];
    for (list, role) in org_lists {
        for entry in list.iter().filter(|e| normalize_login(e) == wanted) {
            log::debug!("found {} as org {} in {}", entry, role, org_name);
            sites.org.push(RemovalSite {
                scope: Scope::Org,
                scope_name: org_name.to_string(),
                role,
            });
        }
    }

    walk_teams(&doc.teams, &mut |_, name, team| {
        let team_lists = [(&team.members, Role::Member), (&team.maintainers, Role::Maintainer)];
        for (list, role) in team_lists {
            let hits = list.iter().filter(|e| normalize_login(e) == wanted).count();
            for _ in 0..hits {
                sites.team.push(RemovalSite {
                    scope: Scope::Team,
                    scope_name: name.to_string(),
                    role,
                });
            }
        }
    })?;

    Ok(sites)
}
