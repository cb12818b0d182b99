//! # Error Handling
//!
//! This module defines the centralized error type for the `korg` library. It
//! uses `thiserror` to build a single `Error` enum covering every failure the
//! membership tools can hit, each variant carrying enough context (org name,
//! file path, username) to produce a useful message without extra wrapping.
//!
//! The variants fall into four groups:
//!
//! - **Input errors**: invalid org names, unreadable or malformed config files,
//!   unknown fields rejected by strict parsing, bad command arguments.
//! - **State errors**: a user who is already a member, not a member, or a
//!   protected admin of an organization.
//! - **External errors**: failing `git` commands and failing HTTP lookups.
//! - **Wrapped errors**: `#[from]` conversions for the libraries we sit on.
//!
//! Consistency findings (validator violations, count mismatches) are not
//! errors; they are collected as data and reported by the caller. The one
//! exception is [`Error::Restriction`], which chains every restriction
//! violation of an organization into a single reportable error.

use std::path::PathBuf;

use thiserror::Error;

use crate::restrictions::RestrictionViolation;

/// Main error type for korg operations
#[derive(Error, Debug)]
pub enum Error {
    /// One or more org names are not in the list of managed orgs.
    #[error("specified invalid orgs: {}", orgs.join(", "))]
    InvalidOrgs { orgs: Vec<String> },

    /// A config file could not be read or parsed.
    #[error("Configuration error in {}: {message}{}", path.display(), hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        path: PathBuf,
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// Strict parsing found a key the config model does not know about.
    #[error("unknown field `{field}` in {}", path.display())]
    UnknownField { path: PathBuf, field: String },

    /// The user is already listed as a member or admin of the org.
    #[error("user {username} already exists in org {org}")]
    AlreadyMember { username: String, org: String },

    /// The user is not listed as a member of the org.
    #[error("user {username} doesn't exist in org {org}")]
    NotMember { username: String, org: String },

    /// Admins cannot be removed through the membership commands.
    #[error("user {username} is an admin for org {org}")]
    IsAdmin { username: String, org: String },

    /// Team nesting exceeded the supported depth.
    #[error("team {team} is nested deeper than {max_depth} levels")]
    TeamDepth { team: String, max_depth: usize },

    /// Teams in an org reference repositories their restriction does not allow.
    #[error("restriction violations in org {org}:{}", violations.iter().map(|v| format!("\n{}", v)).collect::<String>())]
    Restriction {
        org: String,
        violations: Vec<RestrictionViolation>,
    },

    /// A `git` invocation failed.
    #[error("Git command failed in {}: {command} - {stderr}", repo_root.display())]
    GitCommand {
        command: String,
        repo_root: PathBuf,
        stderr: String,
    },

    /// An external HTTP service returned an error or an unexpected payload.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// A command argument was malformed.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A CSV error, wrapped from `csv::Error`.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// An HTTP client error, wrapped from `reqwest::Error`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_orgs() {
        let error = Error::InvalidOrgs {
            orgs: vec!["foo".to_string(), "bar".to_string()],
        };
        assert_eq!(error.to_string(), "specified invalid orgs: foo, bar");
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            path: PathBuf::from("config/kubernetes/org.yaml"),
            message: "unexpected end of stream".to_string(),
            hint: Some("check indentation of the teams block".to_string()),
        };
        let display = error.to_string();
        assert!(display.contains("config/kubernetes/org.yaml"));
        assert!(display.contains("unexpected end of stream"));
        assert!(display.contains("hint: check indentation"));
    }

    #[test]
    fn test_error_display_state_errors() {
        let already = Error::AlreadyMember {
            username: "Jane".to_string(),
            org: "kubernetes".to_string(),
        };
        assert_eq!(already.to_string(), "user Jane already exists in org kubernetes");

        let admin = Error::IsAdmin {
            username: "root".to_string(),
            org: "kubernetes-sigs".to_string(),
        };
        assert_eq!(admin.to_string(), "user root is an admin for org kubernetes-sigs");

        let missing = Error::NotMember {
            username: "ghost".to_string(),
            org: "kubernetes".to_string(),
        };
        assert!(missing.to_string().contains("doesn't exist"));
    }

    #[test]
    fn test_error_display_restriction_chains_violations() {
        let error = Error::Restriction {
            org: "kubernetes".to_string(),
            violations: vec![
                RestrictionViolation {
                    path: "config/kubernetes/sig-foo/teams.yaml".to_string(),
                    team: "foo-admins".to_string(),
                    repo: "baz".to_string(),
                },
                RestrictionViolation {
                    path: "config/kubernetes/sig-foo/teams.yaml".to_string(),
                    team: "foo-admins".to_string(),
                    repo: "qux".to_string(),
                },
            ],
        };
        let display = error.to_string();
        assert!(display.starts_with("restriction violations in org kubernetes:"));
        assert_eq!(display.lines().count(), 3);
        assert!(display.contains("\"baz\""));
        assert!(display.contains("\"qux\""));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(error.to_string().contains("YAML parsing error"));
    }
}
