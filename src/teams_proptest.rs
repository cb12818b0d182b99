//! Property-based tests for team traversal and membership mutation.
//!
//! These tests use proptest to generate random team trees and member lists
//! and verify that invariants hold for all of them.

use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::config::{OrgConfig, Team};
use crate::membership::{add_member, contains_ignore_case, remove_member};
use crate::teams::{expand_teams, normalize_alias_name, walk_teams};

fn login() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,6}"
}

fn team_tree() -> impl Strategy<Value = Team> {
    let leaf = (
        prop::collection::vec(login(), 0..4),
        prop::collection::vec(login(), 0..2),
    )
        .prop_map(|(members, maintainers)| Team {
            members,
            maintainers,
            ..Default::default()
        });

    leaf.prop_recursive(4, 24, 3, |inner| {
        (
            prop::collection::vec(login(), 0..4),
            prop::collection::vec(login(), 0..2),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..3),
        )
            .prop_map(|(members, maintainers, children)| Team {
                members,
                maintainers,
                children,
                ..Default::default()
            })
    })
}

proptest! {
    /// Property: alias name normalization is idempotent
    #[test]
    fn normalize_alias_name_is_idempotent(input in ".*") {
        let once = normalize_alias_name(&input);
        prop_assert_eq!(normalize_alias_name(&once), once);
    }

    /// Property: normalized alias names only contain [a-z0-9-]
    #[test]
    fn normalize_alias_name_output_charset(input in ".*") {
        let normalized = normalize_alias_name(&input);
        prop_assert!(normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    /// Property: a team's flattened set contains its own members and
    /// maintainers and the flattened set of every descendant
    #[test]
    fn flattened_team_is_superset_of_descendants(root in team_tree()) {
        let mut teams = BTreeMap::new();
        teams.insert("root".to_string(), root);

        let expanded = expand_teams(&teams).unwrap();
        let mut nodes = Vec::new();
        walk_teams(&teams, &mut |path, _, team| nodes.push((path.to_string(), team.clone()))).unwrap();
        prop_assert_eq!(expanded.len(), nodes.len());

        for (i, (path, team)) in nodes.iter().enumerate() {
            let flattened = &expanded[i].members;
            for login in team.members.iter().chain(&team.maintainers) {
                prop_assert!(flattened.contains(login));
            }

            let prefix = format!("{}.", path);
            for (j, (other, _)) in nodes.iter().enumerate() {
                if other.starts_with(&prefix) {
                    prop_assert!(
                        expanded[j].members.is_subset(flattened),
                        "{} is not a superset of {}",
                        path,
                        other
                    );
                }
            }
        }
    }

    /// Property: adding then removing a new user leaves the member list unchanged
    #[test]
    fn add_then_remove_round_trips(
        members in prop::collection::btree_set("[a-z][a-z0-9]{0,7}", 0..12),
        username in "[A-Za-z][A-Za-z0-9]{0,7}",
    ) {
        let members: Vec<String> = members.into_iter().collect();
        prop_assume!(!contains_ignore_case(&members, &username));

        let original = OrgConfig {
            members: members.clone(),
            ..Default::default()
        };
        let mut config = original.clone();
        add_member(&mut config, "kubernetes", &username).unwrap();
        prop_assert!(contains_ignore_case(&config.members, &username));
        remove_member(&mut config, "kubernetes", &username).unwrap();
        prop_assert_eq!(config, original);
    }
}
