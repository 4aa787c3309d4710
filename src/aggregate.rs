//! Contributor aggregation.
//!
//! Folds collection results into a single set of distinct identities. All
//! state is kept in ordered sets and maps and merged with commutative
//! operations (set union, maximum), so folding the same results in any order
//! produces an identical report.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::collector::{CollectionResult, Outcome};
use crate::error::Failure;
use crate::identity::{IdentityKey, RawCommit};
use crate::repo::RepoIdentifier;

/// Everything known about one distinct contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contributor {
    pub key: IdentityKey,
    /// Every display name seen for this identity
    pub names: BTreeSet<String>,
    /// Every raw email seen for this identity
    pub emails: BTreeSet<String>,
    pub repos: BTreeSet<String>,
    /// Latest commit, in epoch milliseconds
    pub last_commit: i64,
}

/// Per-repository totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSummary {
    pub repo: String,
    pub commits: usize,
    pub contributors: usize,
}

/// The final result of a counting run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub contributor_count: usize,
    /// Sorted by identity key
    pub contributors: Vec<Contributor>,
    /// Successfully scanned repositories, sorted by path
    pub repos: Vec<RepoSummary>,
    /// Repositories and discovery targets that could not be scanned
    pub failures: Vec<Failure>,
}

impl AggregateReport {
    pub fn identities(&self) -> impl Iterator<Item = &IdentityKey> {
        self.contributors.iter().map(|c| &c.key)
    }

    /// True when some repository or discovery target failed, so the count
    /// may be lower than the real one.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Accumulates results one at a time.
#[derive(Debug, Default)]
pub struct ContributorAggregator {
    contributors: BTreeMap<IdentityKey, Contributor>,
    repos: BTreeMap<RepoIdentifier, RepoSummary>,
    repo_identities: BTreeMap<RepoIdentifier, BTreeSet<IdentityKey>>,
    failures: BTreeSet<Failure>,
}

impl ContributorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: CollectionResult) {
        match result.outcome {
            Outcome::Commits(commits) => self.add_commits(&result.repo, &commits),
            Outcome::Failed(failure) => self.add_failure(failure),
        }
    }

    pub fn add_failure(&mut self, failure: Failure) {
        self.failures.insert(failure);
    }

    fn add_commits(&mut self, repo: &RepoIdentifier, commits: &[RawCommit]) {
        let path = repo.to_string();
        let repo_identities = self.repo_identities.entry(repo.clone()).or_default();

        for commit in commits {
            let key = commit.identity();
            repo_identities.insert(key.clone());

            let contributor = self
                .contributors
                .entry(key.clone())
                .or_insert_with(|| Contributor {
                    key,
                    names: BTreeSet::new(),
                    emails: BTreeSet::new(),
                    repos: BTreeSet::new(),
                    last_commit: commit.timestamp,
                });
            let name = commit.name.trim();
            if !name.is_empty() {
                contributor.names.insert(name.to_string());
            }
            if let Some(email) = commit.email.as_deref().map(str::trim) {
                if !email.is_empty() {
                    contributor.emails.insert(email.to_string());
                }
            }
            contributor.repos.insert(path.clone());
            contributor.last_commit = contributor.last_commit.max(commit.timestamp);
        }

        let summary = self
            .repos
            .entry(repo.clone())
            .or_insert_with(|| RepoSummary {
                repo: path,
                commits: 0,
                contributors: 0,
            });
        summary.commits += commits.len();
    }

    pub fn finish(self) -> AggregateReport {
        let mut repos = self.repos;
        for (repo, identities) in &self.repo_identities {
            if let Some(summary) = repos.get_mut(repo) {
                summary.contributors = identities.len();
            }
        }

        AggregateReport {
            contributor_count: self.contributors.len(),
            contributors: self.contributors.into_values().collect(),
            repos: repos.into_values().collect(),
            failures: self.failures.into_iter().collect(),
        }
    }
}

/// Folds every collection result into a report.
pub fn aggregate(results: impl IntoIterator<Item = CollectionResult>) -> AggregateReport {
    let mut aggregator = ContributorAggregator::new();
    for result in results {
        aggregator.add(result);
    }
    aggregator.finish()
}
