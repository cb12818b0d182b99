//! Staging and committing config changes with the system `git`.
//!
//! Using the `git` binary picks up the user's identity, signing and hook
//! configuration exactly as a manual commit would.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Trait for version control operations - allows mocking in tests
pub trait VersionControl {
    /// Stage `files` (relative to `repo_root`) and commit them with `message`.
    fn commit(&self, repo_root: &Path, files: &[PathBuf], message: &str) -> Result<()>;
}

/// The default implementation of `VersionControl`, which runs `git`.
pub struct Git;

impl VersionControl for Git {
    fn commit(&self, repo_root: &Path, files: &[PathBuf], message: &str) -> Result<()> {
        commit_changes(repo_root, files, message)
    }
}

/// Stage `files` and create a commit in the repository at `repo_root`.
///
/// `message` may contain several paragraphs separated by blank lines; each is
/// passed as its own `-m` so git formats them the same way.
pub fn commit_changes(repo_root: &Path, files: &[PathBuf], message: &str) -> Result<()> {
    let mut add = vec!["add".to_string(), "--".to_string()];
    add.extend(files.iter().map(|f| f.to_string_lossy().into_owned()));
    run_git(repo_root, &add)?;

    let mut commit = vec!["commit".to_string()];
    for paragraph in message.split("\n\n").filter(|p| !p.trim().is_empty()) {
        commit.push("-m".to_string());
        commit.push(paragraph.to_string());
    }
    run_git(repo_root, &commit)
}

fn run_git(repo_root: &Path, args: &[String]) -> Result<()> {
    debug!("running git {:?} in {}", args, repo_root.display());
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            repo_root: repo_root.to_path_buf(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            repo_root: repo_root.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records commits instead of running git.
    #[derive(Default)]
    pub struct RecordingVersionControl {
        pub commits: RefCell<Vec<(Vec<PathBuf>, String)>>,
    }

    impl VersionControl for RecordingVersionControl {
        fn commit(&self, _repo_root: &Path, files: &[PathBuf], message: &str) -> Result<()> {
            self.commits
                .borrow_mut()
                .push((files.to_vec(), message.to_string()));
            Ok(())
        }
    }
}
