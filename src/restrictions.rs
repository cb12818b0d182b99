//! # Repository Restrictions
//!
//! Limits which repositories the teams of a config file may reference. A
//! restrictions file lists rules of the form
//!
//! ```yaml
//! restrictions:
//!   - path: "config/kubernetes-sigs/sig-foo/*"
//!     allowedRepos:
//!       - "^foo-.*"
//! ```
//!
//! The first rule whose `path` glob matches a config file applies to it. A
//! file no rule matches falls under an implicit catch-all that allows no
//! repositories at all.

use std::fmt;
use std::path::Path;

use glob::{MatchOptions, Pattern};
use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config;
use crate::defaults::{ORG_FILE_NAME, TEAMS_FILE_NAME};
use crate::error::{Error, Result};
use crate::loader::org_dir;
use crate::teams::walk_teams;

/// On-disk form of the restrictions file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestrictionsConfig {
    #[serde(default)]
    pub restrictions: Vec<RestrictionSpec>,
}

/// One rule as written in the restrictions file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictionSpec {
    pub path: String,
    #[serde(default, rename = "allowedRepos", skip_serializing_if = "Vec::is_empty")]
    pub allowed_repos: Vec<String>,
}

/// A rule with its glob and regexes compiled.
#[derive(Debug, Clone)]
pub struct Restriction {
    /// `None` for the catch-all, which matches every path.
    pub path: Option<Pattern>,
    pub allowed_repos: Vec<Regex>,
}

impl Restriction {
    /// The implicit rule: matches every path, allows no repository.
    pub fn catch_all() -> Self {
        Self {
            path: None,
            allowed_repos: Vec::new(),
        }
    }

    /// Returns `true` if this rule applies to the config file at `path`.
    pub fn applies_to(&self, path: &str) -> bool {
        self.path
            .as_ref()
            .map_or(true, |pattern| pattern.matches_with(path, match_options()))
    }

    /// Returns `true` if `repo` matches one of the allowed patterns.
    pub fn allows(&self, repo: &str) -> bool {
        self.allowed_repos.iter().any(|re| re.is_match(repo))
    }
}

/// A team referencing a repository its restriction forbids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionViolation {
    pub path: String,
    pub team: String,
    pub repo: String,
}

impl fmt::Display for RestrictionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: cannot define repo {:?} for team {:?}",
            self.path, self.repo, self.team
        )
    }
}

/// Read a restrictions file.
pub fn load(path: &Path) -> Result<RestrictionsConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        message: format!("read restrictions config: {}", e),
        hint: None,
    })?;
    serde_yaml::from_str(&content).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        message: format!("unmarshal restrictions config: {}", e),
        hint: None,
    })
}

/// Compile every rule, failing on the first bad glob or regex.
pub fn compile(config: &RestrictionsConfig) -> Result<Vec<Restriction>> {
    config
        .restrictions
        .iter()
        .map(|spec| -> Result<Restriction> {
            let allowed_repos = spec
                .allowed_repos
                .iter()
                .map(|repo| Regex::new(repo))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(Restriction {
                path: Some(Pattern::new(&spec.path)?),
                allowed_repos,
            })
        })
        .collect()
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// The first rule whose glob matches `path`, or the catch-all.
pub fn restriction_for_path(restrictions: &[Restriction], path: &str) -> Restriction {
    restrictions
        .iter()
        .find(|r| r.applies_to(path))
        .cloned()
        .unwrap_or_else(Restriction::catch_all)
}

/// Check every team (at any depth) of the config file at `path`.
pub fn check_file(restrictions: &[Restriction], path: &Path) -> Result<Vec<RestrictionViolation>> {
    let display = path.to_string_lossy().into_owned();
    let org = config::from_file(path)?;
    let restriction = restriction_for_path(restrictions, &display);

    let mut violations = Vec::new();
    walk_teams(&org.teams, &mut |_, name, team| {
        for repo in team.repos.keys() {
            if !restriction.allows(repo) {
                violations.push(RestrictionViolation {
                    path: display.clone(),
                    team: name.to_string(),
                    repo: repo.clone(),
                });
            }
        }
    })?;
    Ok(violations)
}

/// Check an org's `org.yaml` and the `teams.yaml` files of its immediate
/// subdirectories.
///
/// All violations of the org are chained into one [`Error::Restriction`].
pub fn check_org(restrictions: &[Restriction], org: &str, org_yaml: &Path) -> Result<()> {
    info!("Validating restrictions for {} org", org);
    let prefix = org_dir(org_yaml);

    let mut violations = Vec::new();
    for entry in WalkDir::new(prefix).min_depth(1).max_depth(2).sort_by_file_name() {
        let entry = entry?;
        let is_dir = entry.file_type().is_dir();
        let relevant = match entry.depth() {
            1 => !is_dir && entry.file_name() == ORG_FILE_NAME,
            _ if is_dir => {
                info!("Skipping {} and its children", entry.path().display());
                false
            }
            _ => entry.file_name() == TEAMS_FILE_NAME,
        };
        if relevant {
            violations.extend(check_file(restrictions, entry.path())?);
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::Restriction {
            org: org.to_string(),
            violations,
        })
    }
}
