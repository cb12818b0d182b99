//! End-to-end tests for the `restrictions` command.

mod common;
use common::prelude::*;

fn repo(repo_name: &str) -> TestFixture {
    TestFixture::new()
        .with_org("foo", "members:\n- a\n")
        .with_teams(
            "foo",
            "sig-x",
            &format!("teams:\n  sig-x:\n    repos:\n      {}: write\n", repo_name),
        )
        .with_file(
            "restrictions.yaml",
            "restrictions:\n  - path: \"config/foo/*/*\"\n    allowedRepos:\n      - \"^bar-.*\"\n",
        )
}

#[test]
fn test_allowed_repo_passes() {
    repo("bar-service")
        .command()
        .args([
            "restrictions",
            "--restrictions",
            "restrictions.yaml",
            "--orgs",
            "foo=config/foo/org.yaml",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo: ok"));
}

#[test]
fn test_forbidden_repo_is_reported() {
    repo("baz-service")
        .command()
        .args([
            "restrictions",
            "--restrictions",
            "restrictions.yaml",
            "--orgs",
            "foo=config/foo/org.yaml",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "\"config/foo/sig-x/teams.yaml\": cannot define repo \"baz-service\" for team \"sig-x\"",
        ));
}

#[test]
fn test_unmatched_path_allows_nothing() {
    let fixture = repo("bar-service").with_org(
        "other",
        "teams:\n  t:\n    repos:\n      bar-service: read\n",
    );

    fixture
        .command()
        .args([
            "restrictions",
            "--restrictions",
            "restrictions.yaml",
            "--orgs",
            "foo=config/foo/org.yaml",
            "other=config/other/org.yaml",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("foo: ok"))
        .stderr(predicate::str::contains("restriction violations in org other"));
}

#[test]
fn test_invalid_regex_is_an_input_error() {
    let fixture = repo("bar-service").with_file(
        "bad.yaml",
        "restrictions:\n  - path: \"*\"\n    allowedRepos: [\"(\"]\n",
    );

    fixture
        .command()
        .args([
            "restrictions",
            "--restrictions",
            "bad.yaml",
            "--orgs",
            "foo=config/foo/org.yaml",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Regex error"));
}

#[test]
fn test_bare_org_file_name_checks_fragments() {
    let fixture = repo("baz-service").with_file(
        "config/foo/restrictions.yaml",
        "restrictions:\n  - path: \"./*/*\"\n    allowedRepos:\n      - \"^bar-.*\"\n",
    );

    fixture
        .command()
        .current_dir(fixture.path().join("config/foo"))
        .args([
            "restrictions",
            "--restrictions",
            "restrictions.yaml",
            "--orgs",
            "foo=org.yaml",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "\"./sig-x/teams.yaml\": cannot define repo \"baz-service\" for team \"sig-x\"",
        ));
}
