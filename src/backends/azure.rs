//! Azure DevOps backend.
//!
//! Organizations contain projects, projects contain repositories. Project
//! listings are paginated with a continuation token returned in a response
//! header; commit listings use `$top`/`$skip` page numbers and filter by date
//! on the server.

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use serde::Deserialize;

use super::{parse_commit_date, CommitSource, OrgListing, RepoDiscovery};
use crate::api::{ApiClient, ClientOptions};
use crate::error::Result;
use crate::identity::RawCommit;
use crate::repo::RepoIdentifier;
use crate::source::SourceSpec;

const API_VERSION: &str = "7.0";
const CONTINUATION_HEADER: &str = "x-ms-continuationtoken";
const PROJECT_PAGE_SIZE: &str = "100";
const DEFAULT_COMMIT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Deserialize)]
struct List<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Project {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repository {
    name: String,
    #[serde(default)]
    is_disabled: bool,
}

#[derive(Debug, Deserialize)]
struct Commit {
    author: GitUser,
}

#[derive(Debug, Deserialize)]
struct GitUser {
    name: String,
    email: Option<String>,
    date: String,
}

pub struct AzureDevOpsBackend {
    spec: SourceSpec,
    client: ApiClient,
    commit_page_size: usize,
}

impl AzureDevOpsBackend {
    pub fn new(spec: SourceSpec, options: &ClientOptions) -> Result<Self> {
        let client = ApiClient::new(&spec, options)?;
        Ok(Self {
            spec,
            client,
            commit_page_size: DEFAULT_COMMIT_PAGE_SIZE,
        })
    }

    /// Overrides the number of commits requested per page.
    pub fn with_commit_page_size(mut self, size: usize) -> Self {
        self.commit_page_size = size.max(1);
        self
    }

    fn list_projects(&self, org: &str) -> Result<Vec<String>> {
        let target = format!("{} {}", self.spec.org_term, org);
        let mut projects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut url = self.client.endpoint(&[org, "_apis", "projects"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("api-version", API_VERSION);
                query.append_pair("$top", PROJECT_PAGE_SIZE);
                if let Some(token) = &continuation {
                    query.append_pair("continuationToken", token);
                }
            }

            let response = self.client.get_json::<List<Project>>(&url, &target)?;
            projects.extend(response.body.value.into_iter().map(|p| p.name));

            let next = response
                .headers
                .get(CONTINUATION_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from);
            match next {
                None => break,
                Some(token) if continuation.as_deref() == Some(token.as_str()) => {
                    warn!("Continuation token repeated while listing {}; stopping", target);
                    break;
                }
                token => continuation = token,
            }
        }

        debug!("Found {} projects in {}", projects.len(), target);
        Ok(projects)
    }
}

impl CommitSource for AzureDevOpsBackend {
    fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    fn fetch_commits(&self, repo: &RepoIdentifier, since: DateTime<Utc>) -> Result<Vec<RawCommit>> {
        let target = repo.to_string();
        let project = repo.project.as_deref().unwrap_or_default();
        let from_date = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let cutoff = since.timestamp_millis();
        let mut commits = Vec::new();
        let mut skip = 0usize;

        loop {
            let mut url = self.client.endpoint(&[
                &repo.org,
                project,
                "_apis",
                "git",
                "repositories",
                &repo.name,
                "commits",
            ])?;
            url.query_pairs_mut()
                .append_pair("api-version", API_VERSION)
                .append_pair("searchCriteria.fromDate", &from_date)
                .append_pair("searchCriteria.$top", &self.commit_page_size.to_string())
                .append_pair("searchCriteria.$skip", &skip.to_string());

            let page = self.client.get_json::<List<Commit>>(&url, &target)?.body;
            let fetched = page.value.len();

            for commit in page.value {
                let timestamp = parse_commit_date(&commit.author.date, &target)?;
                if timestamp < cutoff {
                    continue;
                }
                commits.push(RawCommit {
                    name: commit.author.name,
                    email: commit.author.email,
                    timestamp,
                });
            }

            if fetched < self.commit_page_size {
                break;
            }
            skip += fetched;
        }

        Ok(commits)
    }
}

impl RepoDiscovery for AzureDevOpsBackend {
    fn discover_org(&self, org: &str) -> Result<OrgListing> {
        self.list_projects(org).map(OrgListing::Projects)
    }

    fn project_repos(&self, org: &str, project: &str) -> Result<Vec<RepoIdentifier>> {
        let target = format!("project {}/{}", org, project);
        let mut url = self
            .client
            .endpoint(&[org, project, "_apis", "git", "repositories"])?;
        url.query_pairs_mut().append_pair("api-version", API_VERSION);

        let repos = self.client.get_json::<List<Repository>>(&url, &target)?.body;
        Ok(repos
            .value
            .into_iter()
            .filter(|r| {
                if r.is_disabled {
                    debug!("Skipping disabled repo {}/{}/{}", org, project, r.name);
                }
                !r.is_disabled
            })
            .map(|r| RepoIdentifier::new(self.spec.source_type, org, Some(project), &r.name))
            .collect())
    }
}
