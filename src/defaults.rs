//! Default values for korg.
//!
//! This module provides centralized constants used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// GitHub organizations whose membership is managed from this repository.
pub const VALID_ORGS: &[&str] = &[
    "kubernetes",
    "kubernetes-client",
    "kubernetes-csi",
    "kubernetes-sigs",
];

/// Bot account that must be an admin of every org.
pub const REQUIRED_ADMIN: &str = "k8s-ci-robot";

/// Minimum number of approvers an org's OWNERS file must list.
pub const MIN_APPROVERS: usize = 5;

/// Deepest team nesting the traversal will follow.
pub const MAX_TEAM_DEPTH: usize = 32;

/// File name of an org's main config.
pub const ORG_FILE_NAME: &str = "org.yaml";

/// File name of a team fragment inside an org subdirectory.
pub const TEAMS_FILE_NAME: &str = "teams.yaml";

/// File name of the approvers/reviewers list beside an org config.
pub const OWNERS_FILE_NAME: &str = "OWNERS";

/// Query endpoint of the contribution statistics service.
pub const DEVSTATS_URL: &str = "https://k8s.devstats.cncf.io/api/ds/query";

/// Search endpoint of the code search service.
pub const CODE_SEARCH_URL: &str = "https://cs.k8s.io/api/v1/search";

/// Link prefix for a user's OWNERS file hits in the audit report.
pub const OWNERS_LINK_PREFIX: &str = "https://go.k8s.io/owners/";

/// Header written at the top of generated alias files.
pub const ALIASES_PREAMBLE: &str = "# This file is auto-generated from peribolos.
# Do not modify this file, instead modify the peribolos config in k/org repository.

";

/// Returns the org config path relative to the repository root
/// (`config/<org>/org.yaml`).
pub fn org_config_path(org: &str) -> PathBuf {
    Path::new("config").join(org).join(ORG_FILE_NAME)
}

/// Returns `true` if `org` is one of [`VALID_ORGS`].
pub fn is_valid_org(org: &str) -> bool {
    VALID_ORGS.contains(&org)
}

/// Returns the subset of `orgs` that are not managed here, in input order.
pub fn find_invalid_orgs(orgs: &[String]) -> Vec<String> {
    orgs.iter().filter(|o| !is_valid_org(o)).cloned().collect()
}
