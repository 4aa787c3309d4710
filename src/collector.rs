//! Commit collection.
//!
//! Fetches commits for every resolved repository on a dedicated, bounded
//! `rayon` pool so that no more than `concurrency` requests or `git`
//! processes run at once. Pages of a single repository are fetched
//! sequentially inside its `CommitSource` call; parallelism is only across
//! repositories. Results are gathered after all workers finish, in the
//! resolved repository order.
//!
//! Every per-repository error is captured in its [`CollectionResult`]; only
//! a failure to start the pool aborts collection.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use log::{error, info, warn};
use rayon::prelude::*;

use crate::backends::CommitSource;
use crate::error::{Error, Failure, FailureKind, Result};
use crate::identity::RawCommit;
use crate::repo::RepoIdentifier;

/// What happened when collecting one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Commits(Vec<RawCommit>),
    Failed(Failure),
}

/// Per-repository collection result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionResult {
    pub repo: RepoIdentifier,
    pub outcome: Outcome,
}

impl CollectionResult {
    pub fn commits(repo: RepoIdentifier, commits: Vec<RawCommit>) -> Self {
        Self {
            repo,
            outcome: Outcome::Commits(commits),
        }
    }

    pub fn failed(repo: RepoIdentifier, error: &Error) -> Self {
        let failure = Failure::from_error(repo.to_string(), error);
        Self {
            repo,
            outcome: Outcome::Failed(failure),
        }
    }
}

/// Drives a `CommitSource` across many repositories.
pub struct CommitCollector {
    concurrency: usize,
    progress: ProgressBar,
}

impl CommitCollector {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports one tick per finished repository on the given bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn collect<S: CommitSource + ?Sized>(
        &self,
        repos: &BTreeSet<RepoIdentifier>,
        since: DateTime<Utc>,
        source: &S,
    ) -> Result<Vec<CollectionResult>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .build()
            .map_err(|e| Error::config(format!("Cannot start worker pool: {}", e)))?;

        let repos: Vec<&RepoIdentifier> = repos.iter().collect();
        info!(
            "Collecting commits from {} repos with {} workers",
            repos.len(),
            self.concurrency
        );

        let results = pool.install(|| {
            repos
                .par_iter()
                .map(|repo| {
                    let result = collect_one(source, repo, since);
                    self.progress.inc(1);
                    result
                })
                .collect::<Vec<_>>()
        });

        self.progress.finish_and_clear();
        Ok(results)
    }
}

fn collect_one<S: CommitSource + ?Sized>(
    source: &S,
    repo: &RepoIdentifier,
    since: DateTime<Utc>,
) -> CollectionResult {
    match source.fetch_commits(repo, since) {
        Ok(commits) => {
            info!("Fetched {} commits from {}", commits.len(), repo);
            CollectionResult::commits(repo.clone(), commits)
        }
        Err(e) => {
            if e.failure_kind() == FailureKind::Parse {
                error!("Backend returned malformed data for {}: {}", repo, e);
            } else {
                warn!("Skipping {}: {}", repo, e);
            }
            CollectionResult::failed(repo.clone(), &e)
        }
    }
}
