//! `git log` invocation and output parsing for on-disk repositories.
//!
//! The log is requested in a fixed five-line record format:
//!
//! ```text
//! --commit--
//! author:<name>
//! email:<email>
//! date:<unix seconds>
//! <blank>
//! ```
//!
//! `git` terminates the output with a newline, so after splitting on `\n`
//! the line count minus one must be a multiple of five.

use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Utc};
use log::{debug, error, log_enabled, Level};

use crate::error::{Error, Result};
use crate::identity::RawCommit;

pub const COMMIT_MARKER: &str = "--commit--";
const LINES_PER_COMMIT: usize = 5;

/// Arguments for `git log` covering all branches since `since`.
pub fn log_args(since: DateTime<Utc>) -> Vec<String> {
    vec![
        "log".to_string(),
        "--all".to_string(),
        "--date=raw".to_string(),
        format!("--format={}%nauthor:%an%nemail:%ae%ndate:%at%n", COMMIT_MARKER),
        "--since".to_string(),
        since.timestamp().to_string(),
    ]
}

/// Runs `git log` in `repo_dir` and parses its output.
///
/// A non-zero exit status is a `Transport` error carrying git's stderr.
pub fn log_commits(repo_dir: &Path, since: DateTime<Utc>, target: &str) -> Result<Vec<RawCommit>> {
    debug!("Running git log in {}", repo_dir.display());

    let output = Command::new("git")
        .args(log_args(since))
        .current_dir(repo_dir)
        .output()
        .map_err(|e| Error::Transport {
            target: target.to_string(),
            message: format!("Failed to run git: {}", e),
        })?;

    debug!("git log exit status for {}: {}", target, output.status);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("git log stderr for {}:\n{}", target, stderr);
        if !log_enabled!(Level::Debug) {
            error!(
                "git log failed for {}. Re-run with --log-level debug to see its stderr output.",
                target
            );
        }
        return Err(Error::Transport {
            target: target.to_string(),
            message: format!("git log exited with {}: {}", output.status, stderr.trim()),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_log(&stdout, target)
}

/// Parses `git log` output in the fixed record format.
///
/// A line count that does not fit the five-line layout is a `Parse` error
/// and no commits are returned. A record whose first line is not the marker
/// is logged but still parsed.
pub fn parse_log(output: &str, target: &str) -> Result<Vec<RawCommit>> {
    let lines: Vec<&str> = output.split('\n').collect();
    debug!("Got {} lines of git log output for {}", lines.len(), target);

    if (lines.len() - 1) % LINES_PER_COMMIT != 0 {
        debug!("Unparseable git log output for {}:\n{}", target, output);
        error!(
            "Unexpected number of lines ({}) in git log output for {}",
            lines.len(),
            target
        );
        return Err(Error::Parse {
            target: target.to_string(),
            message: format!(
                "Unexpected number of lines in git log output: {} is not {}n + 1",
                lines.len(),
                LINES_PER_COMMIT
            ),
        });
    }

    let records = &lines[..lines.len() - 1];
    records
        .chunks(LINES_PER_COMMIT)
        .map(|record| parse_record(record, target))
        .collect()
}

fn parse_record(record: &[&str], target: &str) -> Result<RawCommit> {
    let marker = record[0].trim();
    if marker != COMMIT_MARKER {
        error!(
            "Found unexpected line in git log output for {} (expecting '{}'): {}",
            target, COMMIT_MARKER, marker
        );
    }

    let name = field_value(record[1], target)?;
    let email = field_value(record[2], target)?;
    let seconds = field_value(record[3], target)?;

    let timestamp = seconds_to_millis(seconds.trim()).ok_or_else(|| Error::Parse {
        target: target.to_string(),
        message: format!("Invalid commit timestamp '{}'", seconds),
    })?;

    Ok(RawCommit {
        name: name.to_string(),
        email: (!email.trim().is_empty()).then(|| email.to_string()),
        timestamp,
    })
}

/// The text after the first `:` of a labeled line.
fn field_value<'a>(line: &'a str, target: &str) -> Result<&'a str> {
    line.trim_end_matches('\r')
        .split_once(':')
        .map(|(_, value)| value)
        .ok_or_else(|| Error::Parse {
            target: target.to_string(),
            message: format!("Expected a labeled line in git log output, got '{}'", line),
        })
}

/// Converts whole Unix seconds to milliseconds with integer arithmetic.
pub fn seconds_to_millis(seconds: &str) -> Option<i64> {
    seconds.parse::<i64>().ok()?.checked_mul(1000)
}
