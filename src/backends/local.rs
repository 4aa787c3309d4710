//! Local git backend.
//!
//! Repositories are directories on disk at `root/<directory>/<repo>`, where
//! the directory plays the role of an organization.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;

use super::{CommitSource, OrgListing, RepoDiscovery};
use crate::error::{Error, Result};
use crate::git;
use crate::identity::RawCommit;
use crate::repo::RepoIdentifier;
use crate::source::SourceSpec;

pub struct LocalBackend {
    spec: SourceSpec,
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(spec: SourceSpec) -> Self {
        let root = PathBuf::from(&spec.url);
        Self { spec, root }
    }

    /// The on-disk location of a repository.
    pub fn repo_path(&self, repo: &RepoIdentifier) -> PathBuf {
        self.root.join(&repo.org).join(&repo.name)
    }
}

impl CommitSource for LocalBackend {
    fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    fn fetch_commits(&self, repo: &RepoIdentifier, since: DateTime<Utc>) -> Result<Vec<RawCommit>> {
        let target = repo.to_string();
        let path = self.repo_path(repo);
        if !path.is_dir() {
            return Err(Error::NotFound {
                target,
                message: format!("No directory at {}", path.display()),
            });
        }
        git::log_commits(&path, since, &target)
    }
}

impl RepoDiscovery for LocalBackend {
    fn discover_org(&self, directory: &str) -> Result<OrgListing> {
        let target = format!("{} {}", self.spec.org_term, directory);
        let dir = self.root.join(directory);

        let entries = fs::read_dir(&dir).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                target: target.clone(),
                message: format!("No directory at {}", dir.display()),
            },
            _ => Error::Transport {
                target: target.clone(),
                message: format!("Cannot read {}: {}", dir.display(), e),
            },
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if is_git_repo(&path) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            } else {
                debug!("Skipping {}: not a git repository", path.display());
            }
        }
        names.sort();

        Ok(OrgListing::Repos(
            names
                .iter()
                .map(|name| RepoIdentifier::new(self.spec.source_type, directory, None, name))
                .collect(),
        ))
    }
}

fn is_git_repo(path: &Path) -> bool {
    path.is_dir() && path.join(".git").exists()
}
