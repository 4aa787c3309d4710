//! Bitbucket Cloud backend.
//!
//! Both repository listings and commit listings are paginated by an absolute
//! `next` URL. The commits endpoint has no date filter and lists every
//! branch in topological rather than date order, so all pages are read and
//! commits are filtered by timestamp on the client.

use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;
use url::Url;

use super::{parse_commit_date, CommitSource, OrgListing, RepoDiscovery};
use crate::api::{ApiClient, ClientOptions};
use crate::error::{Error, Result};
use crate::identity::{split_raw_author, RawCommit};
use crate::repo::RepoIdentifier;
use crate::source::SourceSpec;

const PAGE_LEN: &str = "100";

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct Commit {
    date: String,
    author: Author,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    raw: String,
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    display_name: Option<String>,
}

pub struct BitbucketBackend {
    spec: SourceSpec,
    client: ApiClient,
}

impl BitbucketBackend {
    pub fn new(spec: SourceSpec, options: &ClientOptions) -> Result<Self> {
        let client = ApiClient::new(&spec, options)?;
        Ok(Self { spec, client })
    }

    fn first_page(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.client.endpoint(segments)?;
        url.query_pairs_mut().append_pair("pagelen", PAGE_LEN);
        Ok(url)
    }

    fn next_page(next: Option<String>, target: &str) -> Result<Option<Url>> {
        next.map(|n| {
            Url::parse(&n).map_err(|e| Error::Parse {
                target: target.to_string(),
                message: format!("Invalid next page link '{}': {}", n, e),
            })
        })
        .transpose()
    }
}

impl CommitSource for BitbucketBackend {
    fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    fn fetch_commits(&self, repo: &RepoIdentifier, since: DateTime<Utc>) -> Result<Vec<RawCommit>> {
        let target = repo.to_string();
        let cutoff = since.timestamp_millis();
        let mut commits = Vec::new();
        let mut next = Some(self.first_page(&["repositories", &repo.org, &repo.name, "commits"])?);

        while let Some(url) = next {
            let page: Page<Commit> = self.client.get_json(&url, &target)?.body;

            for commit in page.values {
                let timestamp = parse_commit_date(&commit.date, &target)?;
                if timestamp < cutoff {
                    continue;
                }
                let (mut name, email) = split_raw_author(&commit.author.raw);
                if name.is_empty() {
                    if let Some(display_name) = commit.author.user.and_then(|u| u.display_name) {
                        name = display_name;
                    }
                }
                commits.push(RawCommit {
                    name,
                    email,
                    timestamp,
                });
            }

            next = Self::next_page(page.next, &target)?;
        }

        debug!("Kept {} commits since the cutoff for {}", commits.len(), target);
        Ok(commits)
    }
}

impl RepoDiscovery for BitbucketBackend {
    fn discover_org(&self, workspace: &str) -> Result<OrgListing> {
        let target = format!("{} {}", self.spec.org_term, workspace);
        let mut repos = Vec::new();
        let mut next = Some(self.first_page(&["repositories", workspace])?);

        while let Some(url) = next {
            let page: Page<Repository> = self.client.get_json(&url, &target)?.body;
            repos.extend(
                page.values
                    .into_iter()
                    .map(|r| RepoIdentifier::new(self.spec.source_type, workspace, None, &r.slug)),
            );
            next = Self::next_page(page.next, &target)?;
        }

        debug!("Found {} repos in {}", repos.len(), target);
        Ok(OrgListing::Repos(repos))
    }
}
