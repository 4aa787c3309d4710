//! Repository identifiers.

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};
use crate::source::{SourceSpec, SourceType};

/// A repository to scan: organization, optional project and name, plus the
/// backend it belongs to.
///
/// Equality and ordering are structural. The derived ordering sorts by
/// organization, then project (repositories without a project first), then
/// name, which is the deterministic order used throughout a run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RepoIdentifier {
    pub org: String,
    pub project: Option<String>,
    pub name: String,
    #[serde(skip)]
    pub source: SourceType,
}

impl RepoIdentifier {
    pub fn new(source: SourceType, org: &str, project: Option<&str>, name: &str) -> Self {
        Self {
            org: org.trim().to_string(),
            project: project.map(|p| p.trim().to_string()),
            name: name.trim().to_string(),
            source,
        }
    }

    /// Parses a `/`-joined repository path for the given backend.
    ///
    /// The number of segments must lie within the backend's path-length
    /// bounds. Two segments are `org/repo`, three are `org/project/repo`.
    pub fn parse(spec: &SourceSpec, path: &str) -> Result<Self> {
        let segments: Vec<&str> = path.trim().split('/').map(str::trim).collect();

        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::config_with_hint(
                format!("Invalid {} path '{}': empty path segment", spec.repo_term, path),
                expected_shape(spec),
            ));
        }

        if segments.len() < spec.min_path_length || segments.len() > spec.max_path_length {
            return Err(Error::config_with_hint(
                format!(
                    "Invalid {} path '{}': expected {} segments, got {}",
                    spec.repo_term,
                    path,
                    segment_range(spec),
                    segments.len()
                ),
                expected_shape(spec),
            ));
        }

        match segments.as_slice() {
            [org, name] => Ok(Self::new(spec.source_type, org, None, name)),
            [org, project, name] => Ok(Self::new(spec.source_type, org, Some(project), name)),
            _ => Err(Error::config(format!(
                "Unsupported {} path '{}'",
                spec.repo_term, path
            ))),
        }
    }

    /// The owning `(org, project)` pair, when the repository has a project.
    pub fn project_key(&self) -> Option<(&str, &str)> {
        self.project.as_deref().map(|p| (self.org.as_str(), p))
    }
}

impl fmt::Display for RepoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.project {
            Some(project) => write!(f, "{}/{}/{}", self.org, project, self.name),
            None => write!(f, "{}/{}", self.org, self.name),
        }
    }
}

fn segment_range(spec: &SourceSpec) -> String {
    if spec.min_path_length == spec.max_path_length {
        spec.min_path_length.to_string()
    } else {
        format!("{}-{}", spec.min_path_length, spec.max_path_length)
    }
}

fn expected_shape(spec: &SourceSpec) -> String {
    if spec.has_projects() {
        format!("Use {}/project/{}", spec.org_term, spec.repo_term)
    } else {
        format!("Use {}/{}", spec.org_term, spec.repo_term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_segment_path() {
        let spec = SourceSpec::bitbucket(None, "u", "p");
        let repo = RepoIdentifier::parse(&spec, "bridgecrewio/checkov").unwrap();
        assert_eq!(repo.org, "bridgecrewio");
        assert_eq!(repo.project, None);
        assert_eq!(repo.name, "checkov");
        assert_eq!(repo.to_string(), "bridgecrewio/checkov");
    }

    #[test]
    fn test_parse_three_segment_path() {
        let spec = SourceSpec::azure_devops(None, "pat");
        let repo = RepoIdentifier::parse(&spec, " org / project / repo ").unwrap();
        assert_eq!(repo.project_key(), Some(("org", "project")));
        assert_eq!(repo.to_string(), "org/project/repo");
    }

    #[test]
    fn test_parse_rejects_wrong_segment_count() {
        let bitbucket = SourceSpec::bitbucket(None, "u", "p");
        let err = RepoIdentifier::parse(&bitbucket, "a/b/c").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("expected 2 segments, got 3"));

        let azure = SourceSpec::azure_devops(None, "pat");
        assert!(RepoIdentifier::parse(&azure, "org/repo").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        let spec = SourceSpec::bitbucket(None, "u", "p");
        assert!(RepoIdentifier::parse(&spec, "org/").is_err());
        assert!(RepoIdentifier::parse(&spec, "/repo").is_err());
    }

    #[test]
    fn test_ordering_is_org_project_name() {
        let spec = SourceSpec::azure_devops(None, "pat");
        let mut repos = vec![
            RepoIdentifier::parse(&spec, "b/p/a").unwrap(),
            RepoIdentifier::parse(&spec, "a/q/a").unwrap(),
            RepoIdentifier::parse(&spec, "a/p/z").unwrap(),
            RepoIdentifier::parse(&spec, "a/p/b").unwrap(),
        ];
        repos.sort();
        let names: Vec<String> = repos.iter().map(|r| r.to_string()).collect();
        assert_eq!(names, vec!["a/p/b", "a/p/z", "a/q/a", "b/p/a"]);
    }
}
