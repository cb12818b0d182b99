//! Config parsing tests using datatest-stable for test data discovery
//!
//! Every YAML file under `tests/testdata/valid` must parse strictly into an
//! org config. Every file under `tests/testdata/invalid` must be rejected.

use korg::config::parse_strict;
use std::path::Path;

fn test_config_parsing(path: &Path) -> datatest_stable::Result<()> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read test file {}: {}", path.display(), e))?;

    let expect_valid = !path.components().any(|c| c.as_os_str() == "invalid");
    let parsed = parse_strict(&content, path);

    match (expect_valid, parsed) {
        (true, Ok(config)) => {
            for (name, team) in &config.teams {
                assert!(!name.is_empty(), "empty team name in {}", path.display());
                assert!(
                    team.extra.is_empty(),
                    "team {} in {} kept unknown keys",
                    name,
                    path.display()
                );
            }
            Ok(())
        }
        (true, Err(e)) => Err(format!("{} should parse: {}", path.display(), e).into()),
        (false, Ok(_)) => Err(format!("{} should be rejected", path.display()).into()),
        (false, Err(_)) => Ok(()),
    }
}

datatest_stable::harness!(test_config_parsing, "tests/testdata", r".*\.yaml$");
