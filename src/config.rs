//! # Organization Configuration Model
//!
//! This module defines the in-memory representation of the peribolos-style
//! YAML files that describe a GitHub organization, and the functions that read
//! and write them.
//!
//! ## Key Components
//!
//! - **`OrgConfig`**: one organization: its admins, members, metadata and the
//!   root of its team tree. Both `org.yaml` and `teams.yaml` deserialize into
//!   this type; a teams fragment simply leaves everything except `teams` empty.
//! - **`Team`**: a node of the team tree. Children are owned by their parent,
//!   so the tree cannot contain cycles or shared nodes.
//! - **`FullConfig`**: several orgs keyed by name, the output of `merge`.
//! - **`Owners`**: the `approvers`/`reviewers` lists of an `OWNERS` file.
//!
//! ## Strict Parsing
//!
//! Unknown keys are captured rather than rejected during deserialization, so a
//! lenient load round-trips fields the model does not know about. Strict
//! loading ([`parse_strict`], [`from_file_strict`]) inspects those captured
//! keys at every level of the tree and fails on the first one it finds.
//!
//! Keys are serialized in alphabetical order to match the layout of the
//! existing config files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Visibility of a team on GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    /// Visible to every org member.
    Closed,
    /// Visible only to the team's members and org owners.
    Secret,
}

/// Permission a team (or the org default) grants on a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoPermission {
    None,
    Read,
    Triage,
    Write,
    Maintain,
    Admin,
}

/// A team and, recursively, its sub-teams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    /// Former names of the team, used by GitHub to follow renames.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub previously: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Privacy>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub repos: BTreeMap<String, RepoPermission>,
    /// Sub-teams keyed by name.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        rename = "teams",
        alias = "children",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub children: BTreeMap<String, Team>,
    /// Keys the model does not know about.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One organization as described by `org.yaml` (or a `teams.yaml` fragment).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgConfig {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub admins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_repository_permission: Option<RepoPermission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_organization_projects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_repository_projects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members_can_create_repositories: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub teams: BTreeMap<String, Team>,
    /// Keys the model does not know about.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl OrgConfig {
    /// Dotted paths of every unknown key in this document, e.g.
    /// `teams.team-abc.somethingBizarre`.
    pub fn unknown_fields(&self) -> Vec<String> {
        let mut out: Vec<String> = self.extra.keys().cloned().collect();
        for (name, team) in &self.teams {
            team.collect_unknown_fields(&format!("teams.{}", name), &mut out);
        }
        out
    }
}

impl Team {
    fn collect_unknown_fields(&self, prefix: &str, out: &mut Vec<String>) {
        out.extend(self.extra.keys().map(|k| format!("{}.{}", prefix, k)));
        for (name, child) in &self.children {
            child.collect_unknown_fields(&format!("{}.teams.{}", prefix, name), out);
        }
    }
}

/// Several organizations keyed by name, as produced by the merge tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullConfig {
    #[serde(default)]
    pub orgs: BTreeMap<String, OrgConfig>,
}

/// The reviewer and approver lists of an `OWNERS` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Owners {
    #[serde(default)]
    pub reviewers: Vec<String>,
    #[serde(default)]
    pub approvers: Vec<String>,
}

/// Treat an explicit `null` (e.g. `members:` with nothing under it) like a
/// missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse an org or teams document, keeping unknown keys.
pub fn parse(yaml_content: &str) -> std::result::Result<OrgConfig, serde_yaml::Error> {
    if yaml_content.trim().is_empty() {
        return Ok(OrgConfig::default());
    }
    serde_yaml::from_str(yaml_content)
}

/// Parse an org or teams document, rejecting unknown keys at any level.
///
/// `origin` only labels the error.
pub fn parse_strict(yaml_content: &str, origin: &Path) -> Result<OrgConfig> {
    let config = parse(yaml_content).map_err(|e| parse_error(origin, e))?;
    if let Some(field) = config.unknown_fields().into_iter().next() {
        return Err(Error::UnknownField {
            path: origin.to_path_buf(),
            field,
        });
    }
    Ok(config)
}

/// Read and leniently parse an org or teams file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<OrgConfig> {
    let path = path.as_ref();
    let content = read_to_string(path)?;
    parse(&content).map_err(|e| parse_error(path, e))
}

/// Read and strictly parse an org or teams file.
pub fn from_file_strict<P: AsRef<Path>>(path: P) -> Result<OrgConfig> {
    let path = path.as_ref();
    let content = read_to_string(path)?;
    parse_strict(&content, path)
}

/// Read an `OWNERS` file.
pub fn owners_from_file<P: AsRef<Path>>(path: P) -> Result<Owners> {
    let path = path.as_ref();
    let content = read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| parse_error(path, e))
}

/// Serialize an org config the way it is stored on disk.
pub fn to_yaml(config: &OrgConfig) -> Result<String> {
    Ok(serde_yaml::to_string(config)?)
}

/// Serialize `config` back over an existing file, keeping the file's mode bits.
pub fn save(path: &Path, config: &OrgConfig) -> Result<()> {
    let content = to_yaml(config)?;
    write_preserving_mode(path, content.as_bytes())
}

/// Overwrite an existing file while keeping its permissions.
pub fn write_preserving_mode(path: &Path, content: &[u8]) -> Result<()> {
    let permissions = fs::metadata(path)
        .map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: format!("unable to fetch file info: {}", e),
            hint: None,
        })?
        .permissions();
    fs::write(path, content)?;
    fs::set_permissions(path, permissions)?;
    Ok(())
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        message: format!("unable to read file: {}", e),
        hint: None,
    })
}

fn parse_error(path: &Path, err: serde_yaml::Error) -> Error {
    let hint = err
        .location()
        .map(|loc| format!("check line {}, column {}", loc.line(), loc.column()));
    Error::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
        hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn org_config_with_team_key(key: &str) -> String {
        format!(
            r#"admins:
- admin1
- admin2
billing_email: github@kubernetes.io
default_repository_permission: read
description: Org desc
has_organization_projects: true
has_repository_projects: true
members:
- member1
- member2
members_can_create_repositories: false
name: Org
teams:
  team-abc:
    description: team-abc desc
    members:
    - team-member1
    privacy: closed
    {}:
      abc: write
"#,
            key
        )
    }

    #[test]
    fn test_strict_parse_accepts_known_fields() {
        let content = org_config_with_team_key("repos");
        let config = parse_strict(&content, Path::new("org.yaml")).unwrap();
        let team = &config.teams["team-abc"];
        assert_eq!(team.repos.get("abc"), Some(&RepoPermission::Write));
        assert_eq!(team.privacy, Some(Privacy::Closed));
        assert_eq!(config.admins, vec!["admin1", "admin2"]);
        assert_eq!(config.billing_email.as_deref(), Some("github@kubernetes.io"));
    }

    #[test]
    fn test_strict_parse_rejects_unknown_team_field() {
        let content = org_config_with_team_key("somethingBizzare");
        let err = parse_strict(&content, Path::new("org.yaml")).unwrap_err();
        match err {
            Error::UnknownField { field, path } => {
                assert_eq!(field, "teams.team-abc.somethingBizzare");
                assert_eq!(path, PathBuf::from("org.yaml"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_strict_parse_rejects_unknown_top_level_field() {
        let err = parse_strict("members: [a]\nsomethingBizarre: true\n", Path::new("x")).unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref field, .. } if field == "somethingBizarre"));
    }

    #[test]
    fn test_lenient_parse_keeps_unknown_fields() {
        let content = org_config_with_team_key("somethingBizzare");
        let config = parse(&content).unwrap();
        assert!(config.teams["team-abc"].extra.contains_key("somethingBizzare"));

        let yaml = to_yaml(&config).unwrap();
        assert!(yaml.contains("somethingBizzare"));
    }

    #[test]
    fn test_nested_teams_accept_children_alias() {
        let content = r#"
teams:
  parent:
    members: [a]
    children:
      child:
        members: [b]
"#;
        let config = parse_strict(content, Path::new("teams.yaml")).unwrap();
        assert_eq!(config.teams["parent"].children["child"].members, vec!["b"]);
    }

    #[test]
    fn test_empty_lists_parse_as_empty() {
        let config = parse_strict("admins:\n- a\nmembers:\nteams:\n  t:\n    members:\n", Path::new("org.yaml")).unwrap();
        assert!(config.members.is_empty());
        assert!(config.teams["t"].members.is_empty());
    }

    #[test]
    fn test_empty_document_is_empty_config() {
        assert_eq!(parse("").unwrap(), OrgConfig::default());
        assert_eq!(parse("# only a comment\n").unwrap(), OrgConfig::default());
    }

    #[test]
    fn test_serialization_order_is_alphabetical() {
        let config = OrgConfig {
            name: Some("Org".to_string()),
            members: vec!["m".to_string()],
            admins: vec!["a".to_string()],
            ..Default::default()
        };
        let yaml = to_yaml(&config).unwrap();
        let admins = yaml.find("admins").unwrap();
        let members = yaml.find("members").unwrap();
        let name = yaml.find("name").unwrap();
        assert!(admins < members && members < name);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("org.yaml");
        fs::write(&path, "members: [a]\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        let mut config = from_file(&path).unwrap();
        config.members.push("b".to_string());
        save(&path, &config).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(from_file(&path).unwrap().members, vec!["a", "b"]);
    }

    #[test]
    fn test_from_file_reports_path() {
        let err = from_file("does/not/exist.yaml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.yaml"));
    }

    #[test]
    fn test_owners_ignores_other_keys() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("OWNERS");
        fs::write(
            &path,
            "approvers:\n- a\nreviewers:\n- b\nlabels:\n- sig/contributor-experience\n",
        )
        .unwrap();
        let owners = owners_from_file(&path).unwrap();
        assert_eq!(owners.approvers, vec!["a"]);
        assert_eq!(owners.reviewers, vec!["b"]);
    }
}
