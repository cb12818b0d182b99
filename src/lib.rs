//! # korg
//!
//! Tooling for the YAML files that describe a set of GitHub organizations:
//! who the admins and members are, how teams nest, which repositories each
//! team may touch. The `korg` binary wraps each operation in a subcommand;
//! this library holds the logic so it can be tested without a process or a
//! network.
//!
//! ## Quick Example
//!
//! ```
//! use korg::{aliases, config, validate};
//!
//! let org = config::parse(r#"
//! admins: [k8s-ci-robot, lead]
//! members: [alice, bob]
//! teams:
//!   SIG Foo:
//!     members: [alice]
//!     privacy: closed
//!     teams:
//!       sig-foo-leads:
//!         maintainers: [lead]
//!         privacy: closed
//! "#).unwrap();
//!
//! let aliases = aliases::build_aliases(&org).unwrap();
//! assert_eq!(aliases.aliases["sig-foo"], vec!["alice", "lead"]);
//!
//! let violations = validate::validate_org("kubernetes", &org, &Default::default()).unwrap();
//! assert!(violations.is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`, `loader`)**: the `org.yaml`/`teams.yaml`
//!   model, strict and lenient parsing, and loading an org together with the
//!   team fragments in its subdirectories.
//! - **Team traversal (`teams`)**: recursive walks over the team tree, used
//!   for alias expansion and for locating a user before removal.
//! - **Mutation (`membership`, `removal`)**: single-user add/remove on org
//!   member lists, and bulk removal across a directory of files with a
//!   textual cross-check.
//! - **Checks (`validate`, `restrictions`)**: corpus-wide invariants and
//!   per-path repository allow-lists. Findings are returned as data.
//! - **Reporting (`aliases`, `audit`)**: OWNERS_ALIASES generation and the
//!   inactive-member audit.
//! - **Collaborators (`git`, `services`)**: commits and HTTP lookups, each
//!   behind a trait.
//!
//! Every operation takes its options as an explicit value; nothing is kept in
//! process-wide state.

pub mod aliases;
pub mod audit;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod loader;
pub mod membership;
pub mod removal;
pub mod restrictions;
pub mod services;
pub mod teams;
pub mod validate;

#[cfg(test)]
mod teams_proptest;
