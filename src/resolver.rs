//! Repository resolution.
//!
//! Turns [`InclusionRules`] into the concrete, deduplicated and ordered set
//! of repositories to scan:
//!
//! 1. Enumerate every included organization. Organizations that hold
//!    projects contribute their projects (minus skipped ones) to step 2.
//! 2. Enumerate every included project.
//! 3. Add the explicitly listed repositories.
//! 4. Drop repositories in skipped projects and skipped repositories.
//!
//! A `BTreeSet` performs the deduplication and gives the deterministic
//! organization/project/name order. Enumeration failures other than
//! configuration errors are recorded and resolution continues.

use std::collections::BTreeSet;

use log::{debug, info, warn};

use crate::backends::{OrgListing, RepoDiscovery};
use crate::error::{Error, Failure, Result};
use crate::repo::RepoIdentifier;
use crate::rules::InclusionRules;
use crate::source::SourceSpec;

/// The outcome of resolution.
#[derive(Debug, Default)]
pub struct Resolution {
    pub repos: BTreeSet<RepoIdentifier>,
    /// Organizations or projects that could not be enumerated
    pub failures: Vec<Failure>,
}

/// Resolves the repositories to scan.
///
/// Fails with a `Configuration` error, before any discovery call, when the
/// rules contain no inclusion criterion at all.
pub fn resolve<D: RepoDiscovery + ?Sized>(
    spec: &SourceSpec,
    rules: &InclusionRules,
    discovery: &D,
) -> Result<Resolution> {
    if rules.is_empty() {
        let project_flag = if spec.has_projects() { ", --projects" } else { "" };
        return Err(Error::config(format!(
            "At least one of --{}{}, --repos, or --repo-file is required",
            spec.org_flag_name, project_flag
        )));
    }

    let mut resolution = Resolution::default();
    let mut candidates = BTreeSet::new();
    let mut project_targets = rules.project_targets();

    for org in &rules.orgs {
        match discovery.discover_org(org) {
            Ok(OrgListing::Repos(repos)) => {
                debug!("{} {} has {} repos", spec.org_term, org, repos.len());
                candidates.extend(repos);
            }
            Ok(OrgListing::Projects(projects)) => {
                debug!("{} {} has {} projects", spec.org_term, org, projects.len());
                project_targets.extend(projects.into_iter().map(|p| (org.clone(), p)));
            }
            Err(e) => record(&mut resolution, format!("{} {}", spec.org_term, org), e)?,
        }
    }

    for (org, project) in &project_targets {
        if rules.excludes_project(org, project) {
            debug!("Skipping project {}/{}", org, project);
            continue;
        }
        match discovery.project_repos(org, project) {
            Ok(repos) => candidates.extend(repos),
            Err(e) => record(&mut resolution, format!("project {}/{}", org, project), e)?,
        }
    }

    candidates.extend(rules.repos.iter().cloned());

    let before = candidates.len();
    resolution.repos = rules.apply(candidates);
    info!(
        "Resolved {} {}s to scan ({} skipped)",
        resolution.repos.len(),
        spec.repo_term,
        before - resolution.repos.len()
    );

    Ok(resolution)
}

/// Records a discovery failure, propagating only fatal ones.
fn record(resolution: &mut Resolution, target: String, error: Error) -> Result<()> {
    if error.failure_kind().is_fatal() {
        return Err(error);
    }
    warn!("Could not enumerate {}: {}", target, error);
    resolution.failures.push(Failure::from_error(target, &error));
    Ok(())
}
