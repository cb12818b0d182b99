//! # OWNERS_ALIASES Generation
//!
//! Builds the alias file consumed by the OWNERS tooling from an org's team
//! tree: every team (at any depth) becomes an alias listing the flattened
//! membership of the team and its sub-teams.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::{FullConfig, OrgConfig};
use crate::defaults::ALIASES_PREAMBLE;
use crate::error::{Error, Result};
use crate::loader::{load_org, Strictness};
use crate::teams::{expand_teams, normalize_alias_name};

/// Contents of an OWNERS_ALIASES file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AliasConfig {
    pub aliases: BTreeMap<String, Vec<String>>,
}

/// Compute the alias for every team of `config`.
///
/// Member lists are sorted. Teams whose names normalize to the same alias
/// are merged into one entry.
pub fn build_aliases(config: &OrgConfig) -> Result<AliasConfig> {
    let mut merged: BTreeMap<String, (String, BTreeSet<String>)> = BTreeMap::new();

    for team in expand_teams(&config.teams)? {
        let alias = normalize_alias_name(&team.name);
        match merged.get_mut(&alias) {
            Some((first, members)) => {
                warn!(
                    "teams {:?} and {:?} both map to alias {:?}; merging their members",
                    first, team.name, alias
                );
                members.extend(team.members);
            }
            None => {
                merged.insert(alias, (team.name, team.members));
            }
        }
    }

    Ok(AliasConfig {
        aliases: merged
            .into_iter()
            .map(|(alias, (_, members))| (alias, members.into_iter().collect()))
            .collect(),
    })
}

/// Render an alias file, preamble included.
pub fn render(aliases: &AliasConfig) -> Result<String> {
    let body = serde_yaml::to_string(aliases)?;
    Ok(format!("{}{}", ALIASES_PREAMBLE, body))
}

/// Read the org to generate aliases for.
///
/// `path` may be a merged config with a top-level `orgs:` key, in which case
/// `org` selects the entry, or an `org.yaml`, whose team fragments are merged
/// in.
pub fn load_source(path: &Path, org: &str) -> Result<OrgConfig> {
    let content = fs::read_to_string(path)?;
    let value: serde_yaml::Value = serde_yaml::from_str(&content)?;
    if value.get("orgs").is_none() {
        return load_org(path, Strictness::Lenient);
    }

    let mut full: FullConfig = serde_yaml::from_value(value)?;
    full.orgs.remove(org).ok_or_else(|| Error::InvalidArgument {
        message: format!("org {} not found in {}", org, path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{self, Team};

    #[test]
    fn test_build_aliases_from_nested_teams() {
        let config = config::parse(
            r#"
teams:
  SIG Release:
    maintainers: [lead]
    members: [zed, amy]
    teams:
      release-managers:
        members: [rm1]
  Other_Team:
    members: [solo]
"#,
        )
        .unwrap();

        let aliases = build_aliases(&config).unwrap();
        assert_eq!(
            aliases.aliases["sig-release"],
            vec!["amy", "lead", "rm1", "zed"]
        );
        assert_eq!(aliases.aliases["release-managers"], vec!["rm1"]);
        assert_eq!(aliases.aliases["other-team"], vec!["solo"]);
        assert_eq!(aliases.aliases.len(), 3);
    }

    #[test]
    fn test_colliding_alias_names_are_merged() {
        let mut config = OrgConfig::default();
        config.teams.insert(
            "Foo Bar".to_string(),
            Team {
                members: vec!["a".to_string()],
                ..Default::default()
            },
        );
        config.teams.insert(
            "foo_bar".to_string(),
            Team {
                members: vec!["b".to_string()],
                ..Default::default()
            },
        );

        testing_logger::setup();
        let aliases = build_aliases(&config).unwrap();
        assert_eq!(aliases.aliases["foo-bar"], vec!["a", "b"]);
        testing_logger::validate(|captured_logs| {
            assert_eq!(captured_logs.len(), 1);
            assert!(captured_logs[0].body.contains("foo-bar"));
            assert_eq!(captured_logs[0].level, log::Level::Warn);
        });
    }

    #[test]
    fn test_render_starts_with_preamble() {
        let mut aliases = AliasConfig::default();
        aliases
            .aliases
            .insert("sig-foo".to_string(), vec!["a".to_string()]);
        let rendered = render(&aliases).unwrap();
        assert!(rendered.starts_with("# This file is auto-generated from peribolos."));
        assert!(rendered.contains("aliases:\n  sig-foo:\n  - a\n"));
    }

    #[test]
    fn test_load_source_accepts_merged_and_org_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let merged = temp.path().join("merged.yaml");
        fs::write(
            &merged,
            "orgs:\n  kubernetes:\n    teams:\n      t:\n        members: [a]\n",
        )
        .unwrap();
        let org = load_source(&merged, "kubernetes").unwrap();
        assert_eq!(org.teams["t"].members, vec!["a"]);
        assert!(load_source(&merged, "kubernetes-sigs").is_err());

        let org_dir = temp.path().join("config/kubernetes");
        fs::create_dir_all(org_dir.join("sig-a")).unwrap();
        fs::write(org_dir.join("org.yaml"), "members: [a]\n").unwrap();
        fs::write(
            org_dir.join("sig-a/teams.yaml"),
            "teams:\n  sig-a:\n    members: [a]\n",
        )
        .unwrap();
        let org = load_source(&org_dir.join("org.yaml"), "kubernetes").unwrap();
        assert!(org.teams.contains_key("sig-a"));
    }
}
