//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_org("kubernetes", configs::CLEAN_ORG);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// An org that passes every consistency rule.
    pub const CLEAN_ORG: &str = r#"admins:
- admin1
- k8s-ci-robot
members:
- member1
- member2
- team-member1
teams:
  team-abc:
    description: team-abc desc
    members:
    - team-member1
    privacy: closed
"#;

    /// A team fragment for a subdirectory of an org.
    pub const SIG_FOO_TEAMS: &str = r#"teams:
  sig-foo:
    maintainers:
    - admin1
    members:
    - member1
    privacy: closed
    repos:
      foo-service: write
"#;

    /// A team with a key the config model does not know.
    pub const UNKNOWN_FIELD_TEAMS: &str = r#"teams:
  sig-foo:
    members:
    - member1
    somethingBizarre: true
"#;

    /// An OWNERS file with enough approvers.
    pub const OWNERS: &str = r#"approvers:
- admin1
- k8s-ci-robot
- member1
- member2
- team-member1
reviewers:
- member1
"#;
}

/// A test fixture laid out like an org repository: `config/<org>/org.yaml`,
/// team fragments in subdirectories, and arbitrary extra files.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_org("kubernetes", configs::CLEAN_ORG)
///     .with_teams("kubernetes", "sig-foo", configs::SIG_FOO_TEAMS);
///
/// fixture.command().arg("validate").assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add `config/<org>/org.yaml` with the given content.
    pub fn with_org(self, org: &str, content: &str) -> Self {
        let path = format!("config/{}/org.yaml", org);
        self.with_file(&path, content)
    }

    /// Add `config/<org>/<dir>/teams.yaml` with the given content.
    #[allow(dead_code)]
    pub fn with_teams(self, org: &str, dir: &str, content: &str) -> Self {
        let path = format!("config/{}/{}/teams.yaml", org, dir);
        self.with_file(&path, content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of an org's `org.yaml`.
    #[allow(dead_code)]
    pub fn org_path(&self, org: &str) -> PathBuf {
        self.path().join("config").join(org).join("org.yaml")
    }

    /// Read a file relative to the fixture root.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("korg");
        cmd.current_dir(self.path());
        cmd.env_remove("KORG_ROOT");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_org() {
        let fixture = TestFixture::new().with_org("kubernetes", configs::CLEAN_ORG);
        assert!(fixture.org_path("kubernetes").exists());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        let configs = [
            configs::CLEAN_ORG,
            configs::SIG_FOO_TEAMS,
            configs::UNKNOWN_FIELD_TEAMS,
            configs::OWNERS,
        ];
        for config in configs {
            let _: serde_yaml::Value = serde_yaml::from_str(config).unwrap();
        }
    }
}
