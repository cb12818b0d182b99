//! # Org Loading
//!
//! An org is described by `config/<org>/org.yaml` plus any number of team
//! fragments at `config/<org>/<dir>/teams.yaml`. This module reads an
//! `org.yaml` and folds the fragments from its immediate subdirectories into
//! its team map. Directories nested deeper than one level are not searched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{info, warn};
use walkdir::WalkDir;

use crate::config::{self, FullConfig, OrgConfig};
use crate::defaults::{org_config_path, TEAMS_FILE_NAME};
use crate::error::{Error, Result};

/// How unknown YAML keys are treated while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Lenient,
}

/// Read one org or teams file.
pub fn read_config(path: &Path, strictness: Strictness) -> Result<OrgConfig> {
    match strictness {
        Strictness::Strict => config::from_file_strict(path),
        Strictness::Lenient => config::from_file(path),
    }
}

/// The directory holding `org_yaml`; `.` for a bare file name.
pub fn org_dir(org_yaml: &Path) -> &Path {
    org_yaml
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Paths of the `teams.yaml` fragments beside an `org.yaml`, sorted.
pub fn team_fragments(org_yaml: &Path) -> Result<Vec<PathBuf>> {
    let prefix = org_dir(org_yaml);
    let mut fragments = Vec::new();

    for entry in WalkDir::new(prefix)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry?;
        let is_dir = entry.file_type().is_dir();
        match entry.depth() {
            2 if is_dir => info!("Skipping {} and its children", entry.path().display()),
            2 if entry.file_name() == TEAMS_FILE_NAME => fragments.push(entry.into_path()),
            _ => {}
        }
    }

    Ok(fragments)
}

/// Read an `org.yaml` and merge the teams of every fragment beside it.
///
/// A team defined in more than one file keeps the definition read last.
pub fn load_org(org_yaml: &Path, strictness: Strictness) -> Result<OrgConfig> {
    let mut org = read_config(org_yaml, strictness)?;
    for fragment in team_fragments(org_yaml)? {
        let teams = read_config(&fragment, strictness)?.teams;
        merge_teams(&mut org, teams, &fragment);
    }
    Ok(org)
}

/// Add `teams` to `org`, warning about names that are already present.
pub fn merge_teams(org: &mut OrgConfig, teams: BTreeMap<String, config::Team>, source: &Path) {
    for (name, team) in teams {
        if org.teams.contains_key(&name) {
            warn!(
                "team {} from {} overrides an earlier definition",
                name,
                source.display()
            );
        }
        org.teams.insert(name, team);
    }
}

/// Load `config/<org>/org.yaml` (with team fragments) for each org under
/// `repo_root`, strictly.
pub fn load_orgs(repo_root: &Path, orgs: &[String]) -> Result<BTreeMap<String, OrgConfig>> {
    let mut loaded = BTreeMap::new();
    for org in orgs {
        let path = repo_root.join(org_config_path(org));
        loaded.insert(org.clone(), load_org(&path, Strictness::Strict)?);
    }
    Ok(loaded)
}

/// One `name=path/to/org.yaml` input of a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgPart {
    pub name: String,
    pub path: PathBuf,
}

impl FromStr for OrgPart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((name, path)) if !name.is_empty() && !path.is_empty() => Ok(Self {
                name: name.to_string(),
                path: PathBuf::from(path),
            }),
            _ => Err(Error::InvalidArgument {
                message: format!("expected org-name=path/to/org.yaml, got {:?}", s),
            }),
        }
    }
}

/// What a merge does with the teams of each org.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TeamsMode {
    /// Keep the teams written in `org.yaml` only.
    #[default]
    Keep,
    /// Also fold in the `teams.yaml` fragments beside `org.yaml`.
    Merge,
    /// Drop all teams.
    Ignore,
}

/// Inputs of [`merge_orgs`].
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub parts: Vec<OrgPart>,
    pub teams: TeamsMode,
}

/// Combine several org configs into one document keyed by org name.
///
/// Parts are read leniently. Naming the same org twice is an error.
pub fn merge_orgs(options: &MergeOptions) -> Result<FullConfig> {
    let mut full = FullConfig::default();
    for part in &options.parts {
        if full.orgs.contains_key(&part.name) {
            return Err(Error::InvalidArgument {
                message: format!("duplicate key: {}", part.name),
            });
        }
        let org = match options.teams {
            TeamsMode::Keep => read_config(&part.path, Strictness::Lenient)?,
            TeamsMode::Merge => load_org(&part.path, Strictness::Lenient)?,
            TeamsMode::Ignore => OrgConfig {
                teams: BTreeMap::new(),
                ..read_config(&part.path, Strictness::Lenient)?
            },
        };
        full.orgs.insert(part.name.clone(), org);
    }
    Ok(full)
}
