//! Inclusion and exclusion rules.
//!
//! Rules are built from the comma-separated lists given on the command line
//! (plus an optional file of repository paths) and then applied as pure set
//! algebra over [`RepoIdentifier`]s. Exclusion always wins: a repository that
//! is skipped directly, or whose project is skipped, is dropped even when it
//! was also included explicitly.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::repo::RepoIdentifier;
use crate::source::SourceSpec;

/// A project reference, optionally qualified by its organization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectRef {
    pub org: Option<String>,
    pub project: String,
}

impl ProjectRef {
    fn parse(entry: &str) -> Result<Self> {
        match entry.split('/').map(str::trim).collect::<Vec<_>>().as_slice() {
            [project] => Ok(Self {
                org: None,
                project: project.to_string(),
            }),
            [org, project] if !org.is_empty() && !project.is_empty() => Ok(Self {
                org: Some(org.to_string()),
                project: project.to_string(),
            }),
            _ => Err(Error::config_with_hint(
                format!("Invalid project '{}'", entry),
                "Use project or org/project",
            )),
        }
    }

    /// Whether this reference names the given `(org, project)` pair. A bare
    /// project name matches in every organization.
    pub fn matches(&self, org: &str, project: &str) -> bool {
        self.project == project && self.org.as_deref().map_or(true, |o| o == org)
    }
}

/// Raw rule input, as received from the command line.
#[derive(Debug, Clone, Default)]
pub struct RuleInputs {
    pub orgs: Option<String>,
    pub projects: Option<String>,
    pub repos: Option<String>,
    pub skip_projects: Option<String>,
    pub skip_repos: Option<String>,
    pub repo_file: Option<PathBuf>,
}

/// Validated inclusion and exclusion sets.
#[derive(Debug, Clone, Default)]
pub struct InclusionRules {
    pub orgs: BTreeSet<String>,
    pub projects: BTreeSet<ProjectRef>,
    pub repos: BTreeSet<RepoIdentifier>,
    pub skip_projects: BTreeSet<ProjectRef>,
    pub skip_repos: BTreeSet<RepoIdentifier>,
}

impl InclusionRules {
    /// Parses and validates rule input for one backend.
    ///
    /// Repository paths from `--repos` and from the repository file are
    /// merged; every path must match the backend's path-length bounds.
    pub fn from_inputs(spec: &SourceSpec, inputs: &RuleInputs) -> Result<Self> {
        let mut rules = Self {
            orgs: split_list(inputs.orgs.as_deref()).map(String::from).collect(),
            ..Self::default()
        };

        for entry in split_list(inputs.projects.as_deref()) {
            rules.projects.insert(ProjectRef::parse(entry)?);
        }
        for entry in split_list(inputs.skip_projects.as_deref()) {
            rules.skip_projects.insert(ProjectRef::parse(entry)?);
        }

        if !spec.has_projects() && !(rules.projects.is_empty() && rules.skip_projects.is_empty()) {
            return Err(Error::config(format!(
                "Projects are not supported for {} sources",
                spec.source_type
            )));
        }

        if rules.projects.iter().any(|p| p.org.is_none()) && rules.orgs.is_empty() {
            return Err(Error::config_with_hint(
                "A project without an organization requires at least one organization",
                format!(
                    "Use {}/project or add --{}",
                    spec.org_term, spec.org_flag_name
                ),
            ));
        }

        for path in split_list(inputs.repos.as_deref()) {
            rules.repos.insert(RepoIdentifier::parse(spec, path)?);
        }
        if let Some(file) = &inputs.repo_file {
            let content = fs::read_to_string(file).map_err(|e| {
                Error::config(format!("Cannot read repo file {}: {}", file.display(), e))
            })?;
            for line in content.lines().map(str::trim) {
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                rules.repos.insert(RepoIdentifier::parse(spec, line)?);
            }
            if rules.is_empty() {
                return Err(Error::config_with_hint(
                    format!("Repo file {} lists no repositories", file.display()),
                    "Add one repository path per line, or select repositories with another flag",
                ));
            }
        }
        for path in split_list(inputs.skip_repos.as_deref()) {
            rules.skip_repos.insert(RepoIdentifier::parse(spec, path)?);
        }

        Ok(rules)
    }

    /// True when no inclusion criterion was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty() && self.projects.is_empty() && self.repos.is_empty()
    }

    /// Included projects as concrete `(org, project)` pairs. A bare project
    /// is paired with every included organization.
    pub fn project_targets(&self) -> BTreeSet<(String, String)> {
        let mut targets = BTreeSet::new();
        for project in &self.projects {
            match &project.org {
                Some(org) => {
                    targets.insert((org.clone(), project.project.clone()));
                }
                None => {
                    for org in &self.orgs {
                        targets.insert((org.clone(), project.project.clone()));
                    }
                }
            }
        }
        targets
    }

    /// Whether the repository is removed by a skip rule.
    pub fn excludes(&self, repo: &RepoIdentifier) -> bool {
        if self.skip_repos.contains(repo) {
            return true;
        }
        match repo.project_key() {
            Some((org, project)) => self.skip_projects.iter().any(|s| s.matches(org, project)),
            None => false,
        }
    }

    /// Whether a whole project is removed, so it need not be enumerated.
    pub fn excludes_project(&self, org: &str, project: &str) -> bool {
        self.skip_projects.iter().any(|s| s.matches(org, project))
    }

    /// Removes every excluded repository from the candidate set.
    pub fn apply(&self, candidates: BTreeSet<RepoIdentifier>) -> BTreeSet<RepoIdentifier> {
        candidates.into_iter().filter(|r| !self.excludes(r)).collect()
    }
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(list: Option<&str>) -> impl Iterator<Item = &str> {
    list.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn azure() -> SourceSpec {
        SourceSpec::azure_devops(None, "pat")
    }

    fn repo(spec: &SourceSpec, path: &str) -> RepoIdentifier {
        RepoIdentifier::parse(spec, path).unwrap()
    }

    #[test]
    fn test_split_list() {
        let items: Vec<&str> = split_list(Some(" a, b ,,c ,")).collect();
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(split_list(None).count(), 0);
    }

    #[test]
    fn test_empty_inputs_produce_empty_rules() {
        let rules = InclusionRules::from_inputs(&azure(), &RuleInputs::default()).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_skip_only_rules_are_still_empty() {
        let spec = azure();
        let inputs = RuleInputs {
            skip_repos: Some("o/p/r".to_string()),
            ..RuleInputs::default()
        };
        let rules = InclusionRules::from_inputs(&spec, &inputs).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_projects_rejected_for_two_segment_backend() {
        let spec = SourceSpec::bitbucket(None, "u", "p");
        let inputs = RuleInputs {
            orgs: Some("ws".to_string()),
            projects: Some("proj".to_string()),
            ..RuleInputs::default()
        };
        let err = InclusionRules::from_inputs(&spec, &inputs).unwrap_err();
        assert!(err.to_string().contains("Projects are not supported"));
    }

    #[test]
    fn test_bare_project_requires_org() {
        let inputs = RuleInputs {
            projects: Some("proj".to_string()),
            ..RuleInputs::default()
        };
        assert!(InclusionRules::from_inputs(&azure(), &inputs).is_err());
    }

    #[test]
    fn test_project_targets_pair_bare_projects_with_orgs() {
        let inputs = RuleInputs {
            orgs: Some("o1,o2".to_string()),
            projects: Some("shared,o3/own".to_string()),
            ..RuleInputs::default()
        };
        let rules = InclusionRules::from_inputs(&azure(), &inputs).unwrap();
        let targets: Vec<(String, String)> = rules.project_targets().into_iter().collect();
        assert_eq!(
            targets,
            vec![
                ("o1".to_string(), "shared".to_string()),
                ("o2".to_string(), "shared".to_string()),
                ("o3".to_string(), "own".to_string()),
            ]
        );
    }

    #[test]
    fn test_exclusion_wins_over_explicit_inclusion() {
        let spec = azure();
        let inputs = RuleInputs {
            repos: Some("o/p/keep,o/p/drop,o/skipped/r".to_string()),
            skip_projects: Some("skipped".to_string()),
            skip_repos: Some("o/p/drop".to_string()),
            ..RuleInputs::default()
        };
        let rules = InclusionRules::from_inputs(&spec, &inputs).unwrap();
        let kept = rules.apply(rules.repos.clone());
        assert_eq!(kept.len(), 1);
        assert!(kept.contains(&repo(&spec, "o/p/keep")));
    }

    #[test]
    fn test_qualified_skip_project_only_matches_its_org() {
        let spec = azure();
        let inputs = RuleInputs {
            repos: Some("a/p/r,b/p/r".to_string()),
            skip_projects: Some("a/p".to_string()),
            ..RuleInputs::default()
        };
        let rules = InclusionRules::from_inputs(&spec, &inputs).unwrap();
        assert!(rules.excludes(&repo(&spec, "a/p/r")));
        assert!(!rules.excludes(&repo(&spec, "b/p/r")));
    }

    #[test]
    fn test_repo_file_is_merged() {
        let spec = SourceSpec::bitbucket(None, "u", "p");
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# workspace repos").unwrap();
        writeln!(file, "ws/one").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  ws/two  ").unwrap();

        let inputs = RuleInputs {
            repos: Some("ws/one,ws/three".to_string()),
            repo_file: Some(file.path().to_path_buf()),
            ..RuleInputs::default()
        };
        let rules = InclusionRules::from_inputs(&spec, &inputs).unwrap();
        let names: Vec<String> = rules.repos.iter().map(|r| r.to_string()).collect();
        assert_eq!(names, vec!["ws/one", "ws/three", "ws/two"]);
    }

    #[test]
    fn test_repo_file_with_bad_path_fails() {
        let spec = SourceSpec::bitbucket(None, "u", "p");
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ws/project/repo").unwrap();
        let inputs = RuleInputs {
            repo_file: Some(file.path().to_path_buf()),
            ..RuleInputs::default()
        };
        let err = InclusionRules::from_inputs(&spec, &inputs).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_missing_repo_file_is_configuration_error() {
        let spec = SourceSpec::bitbucket(None, "u", "p");
        let inputs = RuleInputs {
            repo_file: Some(PathBuf::from("/nonexistent/repos.txt")),
            ..RuleInputs::default()
        };
        let err = InclusionRules::from_inputs(&spec, &inputs).unwrap_err();
        assert!(err.to_string().contains("Cannot read repo file"));
    }

    #[test]
    fn test_repo_file_with_only_comments_is_rejected() {
        let spec = SourceSpec::bitbucket(None, "u", "p");
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# nothing yet").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "   ").unwrap();

        let inputs = RuleInputs {
            repo_file: Some(file.path().to_path_buf()),
            ..RuleInputs::default()
        };
        let err = InclusionRules::from_inputs(&spec, &inputs).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("lists no repositories"));

        // Another inclusion flag makes an empty file harmless.
        let inputs = RuleInputs {
            orgs: Some("ws".to_string()),
            ..inputs
        };
        let rules = InclusionRules::from_inputs(&spec, &inputs).unwrap();
        assert!(rules.repos.is_empty());
    }
}
