//! Git log parsing tests using datatest-stable for test data discovery
//!
//! Every `*.log` file under `tests/testdata/git-log` holds raw `git log`
//! output in the fixed record format. Its sibling `*.expected` file lists one
//! `<identity> <timestamp-ms>` line per parsed commit, or the single line
//! `parse-error` when the whole log must be rejected.

use active_contributors::git::parse_log;
use std::path::Path;

fn test_git_log_fixture(path: &Path) -> datatest_stable::Result<()> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read test file {}: {}", path.display(), e))?;
    let expected_path = path.with_extension("expected");
    let expected = std::fs::read_to_string(&expected_path)
        .map_err(|e| format!("Failed to read {}: {}", expected_path.display(), e))?;

    let target = path.display().to_string();
    let actual = match parse_log(&content, &target) {
        Ok(commits) => commits
            .iter()
            .map(|c| format!("{} {}\n", c.identity(), c.timestamp))
            .collect::<String>(),
        Err(e) => {
            assert_eq!(
                e.failure_kind(),
                active_contributors::error::FailureKind::Parse,
                "{} failed with a non-parse error: {}",
                path.display(),
                e
            );
            "parse-error\n".to_string()
        }
    };

    assert_eq!(actual, expected, "Unexpected parse result for {}", path.display());
    Ok(())
}

datatest_stable::harness!(test_git_log_fixture, "tests/testdata/git-log", r".*\.log$");
