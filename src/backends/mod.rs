//! # Backends
//!
//! Each supported hosting backend exposes two capabilities behind traits, so
//! the resolver, collector and runner never branch on the backend type:
//!
//! - **`CommitSource`**: fetch every commit of one repository since a cutoff.
//! - **`RepoDiscovery`**: enumerate the repositories (or projects) of an
//!   organization, and the repositories of a project.
//!
//! The concrete implementations are `BitbucketBackend` and
//! `AzureDevOpsBackend`, which talk to REST APIs through [`crate::api`], and
//! `LocalBackend`, which runs `git log` against repositories on disk. Tests
//! substitute in-memory implementations of the same traits.

pub mod azure;
pub mod bitbucket;
pub mod local;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::identity::RawCommit;
use crate::repo::RepoIdentifier;
use crate::source::SourceSpec;

pub use azure::AzureDevOpsBackend;
pub use bitbucket::BitbucketBackend;
pub use local::LocalBackend;

/// Fetches commits for a repository.
pub trait CommitSource: Send + Sync {
    /// The backend this source talks to.
    fn spec(&self) -> &SourceSpec;

    /// Returns every commit of `repo` authored at or after `since`.
    ///
    /// Pagination and rate-limit retries are handled internally. Errors are
    /// `Transport`, `Authorization`, `NotFound` or `Parse`.
    fn fetch_commits(&self, repo: &RepoIdentifier, since: DateTime<Utc>) -> Result<Vec<RawCommit>>;
}

/// What an organization contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgListing {
    /// The organization holds repositories directly.
    Repos(Vec<RepoIdentifier>),
    /// The organization holds projects, which hold repositories.
    Projects(Vec<String>),
}

/// Enumerates repositories for the resolver.
pub trait RepoDiscovery: Send + Sync {
    fn discover_org(&self, org: &str) -> Result<OrgListing>;

    fn project_repos(&self, org: &str, project: &str) -> Result<Vec<RepoIdentifier>> {
        Err(Error::config(format!(
            "Cannot list project {}/{}: projects are not supported by this backend",
            org, project
        )))
    }
}

/// A complete backend: both capabilities.
pub trait Backend: CommitSource + RepoDiscovery {}

impl<T: CommitSource + RepoDiscovery> Backend for T {}

/// Converts an RFC 3339 commit date into epoch milliseconds.
pub(crate) fn parse_commit_date(date: &str, target: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.timestamp_millis())
        .map_err(|e| Error::Parse {
            target: target.to_string(),
            message: format!("Invalid commit date '{}': {}", date, e),
        })
}
