//! # Bulk Member Removal
//!
//! Removes a list of users from every YAML file below a directory, one
//! commit per user.
//!
//! Each file is located two ways: structurally, by parsing it and walking its
//! org lists and team tree ([`find_removal_sites`]), and textually, by
//! counting lines of the form `- <user>` in the raw content. The structured
//! view decides whether a file is touched. The textual count is a
//! cross-check; when the two disagree a warning is logged and the file is
//! rewritten from the parsed model instead of edited as text, so a line that
//! merely looks like the user (a longer login, a repo of the same name) is
//! never deleted.
//!
//! Text edits keep comments and formatting. After an edit the new content is
//! parsed again and must no longer mention the user.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::config::{self, OrgConfig, Team};
use crate::error::Result;
use crate::git::VersionControl;
use crate::membership::normalize_login;
use crate::teams::{find_removal_sites, RemovalSites};

/// Options for a bulk removal run.
#[derive(Debug, Clone)]
pub struct RemovalOptions {
    /// Directory searched for `*.yaml` files; also the directory git runs in.
    pub path: PathBuf,
    /// Write files and commit. Without it nothing on disk changes.
    pub confirm: bool,
}

impl Default for RemovalOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            confirm: false,
        }
    }
}

/// What happened to one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberRemoval {
    pub member: String,
    /// Orgs whose `members`/`admins` named the user, sorted.
    pub orgs: Vec<String>,
    /// Teams (at any depth) that named the user, sorted.
    pub teams: Vec<String>,
    /// Number of list entries naming the user.
    pub occurrences: usize,
    /// Files rewritten, relative to [`RemovalOptions::path`]. Empty in dry-run.
    pub modified: Vec<PathBuf>,
}

impl MemberRemoval {
    /// Commit message for this removal, or `None` if the user was not found.
    ///
    /// The org and team sentences are separate paragraphs.
    pub fn commit_message(&self) -> Option<String> {
        let mut paragraphs = Vec::new();
        match self.orgs.len() {
            0 => {}
            1 => paragraphs.push(format!("Remove {} from the {} org", self.member, self.orgs[0])),
            _ => paragraphs.push(format!(
                "Remove {} from the {} orgs",
                self.member,
                self.orgs.join(", ")
            )),
        }
        match self.teams.len() {
            0 => {}
            1 => paragraphs.push(format!("Remove {} from {} team", self.member, self.teams[0])),
            _ => paragraphs.push(format!(
                "Remove {} from {} teams",
                self.member,
                self.teams.join(", ")
            )),
        }

        if paragraphs.is_empty() {
            None
        } else {
            Some(paragraphs.join("\n\n"))
        }
    }
}

impl fmt::Display for MemberRemoval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.member)?;
        writeln!(f, " Orgs: [{}]", self.orgs.join(" "))?;
        writeln!(f, " Teams: [{}]", self.teams.join(" "))?;
        write!(f, " Number of occurrences: {}", self.occurrences)
    }
}

/// Read the users to remove: one per line, blank lines and `#` comments
/// skipped.
pub fn read_member_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_member_list(&content))
}

fn parse_member_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// The line pattern for `username`, matched case-insensitively.
///
/// Leading whitespace (including the preceding newline) is part of the
/// match, so replacing matches with nothing deletes whole lines.
pub fn member_line_pattern(username: &str) -> Result<Regex> {
    let pattern = format!(r"(?i)(\s+)?- {}(.*)?", regex::escape(username));
    Ok(Regex::new(&pattern)?)
}

/// Count the lines of `content` that look like list entries for the user.
pub fn count_text_matches(pattern: &Regex, content: &str) -> usize {
    pattern.find_iter(content).count()
}

/// Delete every matching line from `content`.
pub fn remove_from_text(pattern: &Regex, content: &str) -> String {
    pattern.replace_all(content, "").into_owned()
}

/// Remove every entry naming `username` from the org lists and, recursively,
/// the team lists of `doc`. Returns how many entries were removed.
pub fn strip_member(doc: &mut OrgConfig, username: &str) -> usize {
    let wanted = normalize_login(username);
    let mut removed = strip(&mut doc.members, &wanted) + strip(&mut doc.admins, &wanted);
    for team in doc.teams.values_mut() {
        removed += strip_team(team, &wanted);
    }
    removed
}

fn strip_team(team: &mut Team, wanted: &str) -> usize {
    let mut removed = strip(&mut team.members, wanted) + strip(&mut team.maintainers, wanted);
    for child in team.children.values_mut() {
        removed += strip_team(child, wanted);
    }
    removed
}

fn strip(list: &mut Vec<String>, wanted: &str) -> usize {
    let before = list.len();
    list.retain(|entry| normalize_login(entry) != wanted);
    before - list.len()
}

/// Result of processing one file for one user.
#[derive(Debug, Default)]
struct FileOutcome {
    sites: RemovalSites,
    written: bool,
}

fn process_file(path: &Path, username: &str, pattern: &Regex, confirm: bool) -> Result<FileOutcome> {
    let content = fs::read_to_string(path)?;
    let doc = match config::parse(&content) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("skipping {}: {}", path.display(), e);
            return Ok(FileOutcome::default());
        }
    };

    let org_name = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sites = find_removal_sites(&doc, &org_name, username)?;
    let text_matches = count_text_matches(pattern, &content);
    let consistent = text_matches == sites.total();
    if !consistent {
        warn!(
            "{}: found {} in {} list entries but {} matching lines",
            path.display(),
            username,
            sites.total(),
            text_matches
        );
    }

    if sites.is_empty() || !confirm {
        return Ok(FileOutcome {
            sites,
            written: false,
        });
    }

    let mut expected = doc;
    strip_member(&mut expected, username);

    let edited = if consistent {
        let edited = remove_from_text(pattern, &content);
        match config::parse(&edited) {
            Ok(reparsed) if reparsed == expected => Some(edited),
            Ok(_) => {
                warn!(
                    "{}: editing the text for {} did not remove exactly its entries; rewriting from the parsed config",
                    path.display(),
                    username
                );
                None
            }
            Err(e) => {
                warn!(
                    "{}: editing the text for {} produced invalid YAML ({}); rewriting from the parsed config",
                    path.display(),
                    username,
                    e
                );
                None
            }
        }
    } else {
        None
    };
    let updated = match edited {
        Some(edited) => edited,
        None => config::to_yaml(&expected)?,
    };

    config::write_preserving_mode(path, updated.as_bytes())?;
    debug!("rewrote {}", path.display());
    Ok(FileOutcome {
        sites,
        written: true,
    })
}

/// The `*.yaml` files below `root`, in a stable order.
pub fn yaml_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "yaml")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Remove one user from every YAML file below `options.path`.
pub fn remove_member(username: &str, options: &RemovalOptions) -> Result<MemberRemoval> {
    let pattern = member_line_pattern(username)?;
    let mut orgs = BTreeSet::new();
    let mut teams = BTreeSet::new();
    let mut removal = MemberRemoval {
        member: username.to_string(),
        ..Default::default()
    };

    for file in yaml_files(&options.path)? {
        let outcome = process_file(&file, username, &pattern, options.confirm)?;
        removal.occurrences += outcome.sites.total();
        orgs.extend(outcome.sites.org.into_iter().map(|s| s.scope_name));
        teams.extend(outcome.sites.team.into_iter().map(|s| s.scope_name));
        if outcome.written {
            let relative = file.strip_prefix(&options.path).unwrap_or(&file);
            removal.modified.push(relative.to_path_buf());
        }
    }

    removal.orgs = orgs.into_iter().collect();
    removal.teams = teams.into_iter().collect();
    Ok(removal)
}

/// Remove each user in turn, committing after every user that was found.
///
/// Files already rewritten for earlier users stay rewritten if a later user
/// fails.
pub fn remove_members(
    members: &[String],
    options: &RemovalOptions,
    vcs: &dyn VersionControl,
) -> Result<Vec<MemberRemoval>> {
    let mut results = Vec::with_capacity(members.len());
    for member in members {
        let removal = remove_member(member, options)?;
        if let Some(message) = removal.commit_message() {
            if options.confirm && !removal.modified.is_empty() {
                vcs.commit(&options.path, &removal.modified, &message)?;
            } else {
                info!("dry-run: would commit {:?}", message);
            }
        }
        results.push(removal);
    }
    Ok(results)
}
