//! # Consistency Validation
//!
//! A battery of invariant checks over fully loaded organizations. Every rule
//! is checked independently and every failure is collected as a
//! [`Violation`]; nothing here stops at the first problem, so a single run
//! shows everything that needs fixing.
//!
//! Logins are compared case-insensitively throughout.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use crate::config::{self, OrgConfig, Owners, Privacy, Team};
use crate::defaults::{MIN_APPROVERS, ORG_FILE_NAME, OWNERS_FILE_NAME, REQUIRED_ADMIN};
use crate::error::Result;
use crate::loader::{load_org, Strictness};
use crate::membership::{duplicates_ignore_case, is_sorted_ignore_case, normalize_login};
use crate::teams::walk_teams;

/// Identifies the rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleId {
    DuplicateAdmins,
    DuplicateMembers,
    AdminIsMember,
    MissingRequiredAdmin,
    UnsortedAdmins,
    UnsortedMembers,
    TeamPrivacy,
    TeamDuplicateMaintainers,
    TeamDuplicateMembers,
    TeamMaintainerNotAdmin,
    TeamMaintainerIsMember,
    TeamMemberNotOrgMember,
    TeamMemberIsAdmin,
    TeamUnsortedMaintainers,
    TeamUnsortedMembers,
    TooFewApprovers,
    ReviewerNotMember,
    ApproverNotMember,
    DuplicateReviewers,
    DuplicateApprovers,
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            RuleId::DuplicateAdmins => "duplicate-admins",
            RuleId::DuplicateMembers => "duplicate-members",
            RuleId::AdminIsMember => "admin-is-member",
            RuleId::MissingRequiredAdmin => "missing-required-admin",
            RuleId::UnsortedAdmins => "unsorted-admins",
            RuleId::UnsortedMembers => "unsorted-members",
            RuleId::TeamPrivacy => "team-privacy",
            RuleId::TeamDuplicateMaintainers => "team-duplicate-maintainers",
            RuleId::TeamDuplicateMembers => "team-duplicate-members",
            RuleId::TeamMaintainerNotAdmin => "team-maintainer-not-admin",
            RuleId::TeamMaintainerIsMember => "team-maintainer-is-member",
            RuleId::TeamMemberNotOrgMember => "team-member-not-org-member",
            RuleId::TeamMemberIsAdmin => "team-member-is-admin",
            RuleId::TeamUnsortedMaintainers => "team-unsorted-maintainers",
            RuleId::TeamUnsortedMembers => "team-unsorted-members",
            RuleId::TooFewApprovers => "too-few-approvers",
            RuleId::ReviewerNotMember => "reviewer-not-member",
            RuleId::ApproverNotMember => "approver-not-member",
            RuleId::DuplicateReviewers => "duplicate-reviewers",
            RuleId::DuplicateApprovers => "duplicate-approvers",
        };
        f.write_str(id)
    }
}

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub org: String,
    /// Dotted team path for team rules.
    pub team: Option<String>,
    pub rule: RuleId,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.team {
            Some(team) => write!(f, "[{}] {}/{}: {}", self.rule, self.org, team, self.message),
            None => write!(f, "[{}] {}: {}", self.rule, self.org, self.message),
        }
    }
}

/// Tunables for the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Accounts that must be org admins.
    pub required_admins: Vec<String>,
    pub min_approvers: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            required_admins: vec![REQUIRED_ADMIN.to_string()],
            min_approvers: MIN_APPROVERS,
        }
    }
}

fn login_set(list: &[String]) -> BTreeSet<String> {
    list.iter().map(|l| normalize_login(l)).collect()
}

fn joined(set: impl IntoIterator<Item = String>) -> String {
    set.into_iter().collect::<Vec<_>>().join(", ")
}

struct Collector<'a> {
    org: &'a str,
    violations: Vec<Violation>,
}

impl Collector<'_> {
    fn org(&mut self, rule: RuleId, message: String) {
        self.violations.push(Violation {
            org: self.org.to_string(),
            team: None,
            rule,
            message,
        });
    }

    fn team(&mut self, team: &str, rule: RuleId, message: String) {
        self.violations.push(Violation {
            org: self.org.to_string(),
            team: Some(team.to_string()),
            rule,
            message,
        });
    }
}

/// Check the org-level and team-level rules for one org.
pub fn validate_org(org_name: &str, org: &OrgConfig, options: &ValidationOptions) -> Result<Vec<Violation>> {
    let mut out = Collector {
        org: org_name,
        violations: Vec::new(),
    };

    let admins = login_set(&org.admins);
    let members = login_set(&org.members);
    let all_members: BTreeSet<String> = admins.union(&members).cloned().collect();

    let dups = duplicates_ignore_case(&org.admins);
    if !dups.is_empty() {
        out.org(RuleId::DuplicateAdmins, format!("{} duplicate admins: {}", dups.len(), dups.join(", ")));
    }
    let dups = duplicates_ignore_case(&org.members);
    if !dups.is_empty() {
        out.org(RuleId::DuplicateMembers, format!("{} duplicate members: {}", dups.len(), dups.join(", ")));
    }

    let both: Vec<String> = admins.intersection(&members).cloned().collect();
    if !both.is_empty() {
        out.org(
            RuleId::AdminIsMember,
            format!("users in both org admin and member roles: {}", both.join(", ")),
        );
    }

    for required in &options.required_admins {
        if !admins.contains(&normalize_login(required)) {
            out.org(RuleId::MissingRequiredAdmin, format!("{} must be an admin", required));
        }
    }

    if !is_sorted_ignore_case(&org.admins) {
        out.org(RuleId::UnsortedAdmins, "admins are unsorted".to_string());
    }
    if !is_sorted_ignore_case(&org.members) {
        out.org(RuleId::UnsortedMembers, "members are unsorted".to_string());
    }

    walk_teams(&org.teams, &mut |path, _, team| {
        check_team(&mut out, path, team, &admins, &all_members);
    })?;

    Ok(out.violations)
}

fn check_team(
    out: &mut Collector<'_>,
    path: &str,
    team: &Team,
    admins: &BTreeSet<String>,
    all_members: &BTreeSet<String>,
) {
    let maintainers = login_set(&team.maintainers);
    let members = login_set(&team.members);

    if team.privacy != Some(Privacy::Closed) {
        out.team(path, RuleId::TeamPrivacy, "team doesn't have the `privacy: closed` field".to_string());
    }

    let dups = duplicates_ignore_case(&team.maintainers);
    if !dups.is_empty() {
        out.team(path, RuleId::TeamDuplicateMaintainers, format!("duplicate maintainers: {}", dups.join(", ")));
    }
    let dups = duplicates_ignore_case(&team.members);
    if !dups.is_empty() {
        out.team(path, RuleId::TeamDuplicateMembers, format!("duplicate members: {}", dups.join(", ")));
    }

    let non_admins: Vec<String> = maintainers.difference(admins).cloned().collect();
    if !non_admins.is_empty() {
        out.team(
            path,
            RuleId::TeamMaintainerNotAdmin,
            format!(
                "non-admins listed as maintainers; these users should be in the members list instead: {}",
                joined(non_admins)
            ),
        );
    }

    let both: Vec<String> = maintainers.intersection(&members).cloned().collect();
    if !both.is_empty() {
        out.team(
            path,
            RuleId::TeamMaintainerIsMember,
            format!("users in both maintainer and member roles: {}", joined(both)),
        );
    }

    let missing: Vec<String> = members.difference(all_members).cloned().collect();
    if !missing.is_empty() {
        out.team(
            path,
            RuleId::TeamMemberNotOrgMember,
            format!("members who are not org members: {}", joined(missing)),
        );
    }

    let admin_members: Vec<String> = members.intersection(admins).cloned().collect();
    if !admin_members.is_empty() {
        out.team(
            path,
            RuleId::TeamMemberIsAdmin,
            format!(
                "org admins listed as members; these users should be maintainers instead: {}",
                joined(admin_members)
            ),
        );
    }

    if !is_sorted_ignore_case(&team.maintainers) {
        out.team(path, RuleId::TeamUnsortedMaintainers, "maintainers are unsorted".to_string());
    }
    if !is_sorted_ignore_case(&team.members) {
        out.team(path, RuleId::TeamUnsortedMembers, "members are unsorted".to_string());
    }
}

/// Check an org's OWNERS file against its membership.
pub fn validate_owners(
    org_name: &str,
    org: &OrgConfig,
    owners: &Owners,
    options: &ValidationOptions,
) -> Vec<Violation> {
    let mut out = Collector {
        org: org_name,
        violations: Vec::new(),
    };

    let all_members: BTreeSet<String> = login_set(&org.admins)
        .union(&login_set(&org.members))
        .cloned()
        .collect();
    let reviewers = login_set(&owners.reviewers);
    let approvers = login_set(&owners.approvers);

    if approvers.len() < options.min_approvers {
        out.org(
            RuleId::TooFewApprovers,
            format!(
                "require at least {} approvers, found {}: {}",
                options.min_approvers,
                approvers.len(),
                joined(approvers.iter().cloned())
            ),
        );
    }

    let missing: Vec<String> = reviewers.difference(&all_members).cloned().collect();
    if !missing.is_empty() {
        out.org(
            RuleId::ReviewerNotMember,
            format!("the following reviewers must be members: {}", joined(missing)),
        );
    }
    let missing: Vec<String> = approvers.difference(&all_members).cloned().collect();
    if !missing.is_empty() {
        out.org(
            RuleId::ApproverNotMember,
            format!("the following approvers must be members: {}", joined(missing)),
        );
    }

    let dups = duplicates_ignore_case(&owners.reviewers);
    if !dups.is_empty() {
        out.org(RuleId::DuplicateReviewers, format!("duplicate reviewers: {}", dups.join(", ")));
    }
    let dups = duplicates_ignore_case(&owners.approvers);
    if !dups.is_empty() {
        out.org(RuleId::DuplicateApprovers, format!("duplicate approvers: {}", dups.join(", ")));
    }

    out.violations
}

/// Validate every org directory under `config_dir` (or only `orgs` when
/// given), including each directory's OWNERS file when present.
///
/// Returns the violations per org, in org name order.
pub fn validate_corpus(
    config_dir: &Path,
    orgs: &[String],
    options: &ValidationOptions,
) -> Result<BTreeMap<String, Vec<Violation>>> {
    let names: Vec<String> = if orgs.is_empty() {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(config_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        names
    } else {
        orgs.to_vec()
    };

    let mut report = BTreeMap::new();
    for name in names {
        let dir = config_dir.join(&name);
        let org = load_org(&dir.join(ORG_FILE_NAME), Strictness::Strict)?;
        let mut violations = validate_org(&name, &org, options)?;

        let owners_path = dir.join(OWNERS_FILE_NAME);
        if owners_path.is_file() {
            let owners = config::owners_from_file(&owners_path)?;
            violations.extend(validate_owners(&name, &org, &owners, options));
        }
        report.insert(name, violations);
    }
    Ok(report)
}
