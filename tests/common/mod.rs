//! Shared test utilities for integration and E2E tests.
//!
//! This module provides fixtures for building throwaway `git` repositories
//! and running the `active-contributors` binary against them.
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
//!     if !git_available() {
//!         return;
//!     }
//!     let fixture = TestFixture::new().with_git_repo("team/api", &[("Alice", "alice@x.com")]);
//!     fixture.command().args(["local", "--directories", "team"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::git_available;
    pub use super::TestFixture;
}

/// Check whether a `git` executable can be run.
///
/// Tests that need real repositories return early when it cannot.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed in {}", args, dir.display());
}

/// A test fixture that provides a temporary root directory of repositories.
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

    /// Create a git repository at `path` with one empty commit per author.
    pub fn with_git_repo(self, path: &str, authors: &[(&str, &str)]) -> Self {
        let child = self.temp_dir.child(path);
        child.create_dir_all().expect("Failed to create repo directory");
        git(child.path(), &["init", "-q"]);

        for (i, (name, email)) in authors.iter().enumerate() {
            let user_name = format!("user.name={}", name);
            let user_email = format!("user.email={}", email);
            let message = format!("commit {}", i);
            git(
                child.path(),
                &[
                    "-c",
                    &user_name,
                    "-c",
                    &user_email,
                    "-c",
                    "commit.gpgsign=false",
                    "commit",
                    "-q",
                    "--allow-empty",
                    "-m",
                    &message,
                ],
            );
        }
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
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

    /// Create a command running in this fixture, which `local` uses as its default root.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("active-contributors");
        cmd.current_dir(self.path()).env_remove("RUST_LOG");
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
    fn test_fixture_with_git_repo() {
        if !git_available() {
            return;
        }
        let fixture = TestFixture::new().with_git_repo("team/api", &[("Alice", "alice@x.com")]);
        assert!(fixture.path().join("team/api/.git").exists());
    }
}
