//! Backend descriptions.
//!
//! A [`SourceSpec`] is built once per run from command-line input and is
//! read-only afterwards. It carries everything the pipeline needs to know
//! about a backend without branching on the backend type: where it lives,
//! how to authenticate, what users call its organizations, and how many
//! path segments identify one of its repositories.

use serde::Serialize;
use std::fmt;

/// The hosting backends supported by this tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Bitbucket,
    AzureDevOps,
    Local,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Bitbucket => "bitbucket",
            SourceType::AzureDevOps => "azuredevops",
            SourceType::Local => "local",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one backend.
#[derive(Clone)]
pub struct SourceSpec {
    pub source_type: SourceType,
    /// API base URL, or the root directory for the local backend
    pub url: String,
    /// Credential in `user:secret` form; empty for the local backend
    pub token: String,
    /// What users call a repository on this backend
    pub repo_term: &'static str,
    /// What users call an organization on this backend
    pub org_term: &'static str,
    /// Name of the flag that lists organizations
    pub org_flag_name: &'static str,
    pub min_path_length: usize,
    pub max_path_length: usize,
    /// Default worker-pool size for commit collection
    pub default_concurrency: usize,
}

// The token never appears in debug output.
impl fmt::Debug for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSpec")
            .field("source_type", &self.source_type)
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("min_path_length", &self.min_path_length)
            .field("max_path_length", &self.max_path_length)
            .field("default_concurrency", &self.default_concurrency)
            .finish()
    }
}

impl SourceSpec {
    pub const BITBUCKET_URL: &'static str = "https://api.bitbucket.org/2.0";
    pub const AZURE_DEVOPS_URL: &'static str = "https://dev.azure.com";

    /// Bitbucket Cloud: `workspace/repo`, basic auth with an app password.
    pub fn bitbucket(url: Option<String>, username: &str, app_password: &str) -> Self {
        Self {
            source_type: SourceType::Bitbucket,
            url: url.unwrap_or_else(|| Self::BITBUCKET_URL.to_string()),
            token: format!("{}:{}", username, app_password),
            repo_term: "repo",
            org_term: "workspace",
            org_flag_name: "workspaces",
            min_path_length: 2,
            max_path_length: 2,
            default_concurrency: 8,
        }
    }

    /// Azure DevOps: `org/project/repo`, basic auth with an empty user and a
    /// personal access token.
    pub fn azure_devops(url: Option<String>, token: &str) -> Self {
        Self {
            source_type: SourceType::AzureDevOps,
            url: url.unwrap_or_else(|| Self::AZURE_DEVOPS_URL.to_string()),
            token: format!(":{}", token),
            repo_term: "repo",
            org_term: "organization",
            org_flag_name: "orgs",
            min_path_length: 3,
            max_path_length: 3,
            default_concurrency: 8,
        }
    }

    /// Local repositories laid out as `root/directory/repo`.
    pub fn local(root: &str) -> Self {
        Self {
            source_type: SourceType::Local,
            url: root.to_string(),
            token: String::new(),
            repo_term: "repo",
            org_term: "directory",
            org_flag_name: "directories",
            min_path_length: 2,
            max_path_length: 2,
            default_concurrency: 2,
        }
    }

    /// Whether repositories on this backend live inside projects.
    pub fn has_projects(&self) -> bool {
        self.max_path_length >= 3
    }

    /// Splits the `user:secret` token for HTTP basic authentication.
    pub fn basic_auth(&self) -> (&str, &str) {
        self.token.split_once(':').unwrap_or((self.token.as_str(), ""))
    }
}
