//! # Active Contributors Library
//!
//! Counts the distinct people who committed to a set of repositories since a
//! cutoff date. It backs the `active-contributors` command-line tool but the
//! pipeline can be driven directly with any [`backends::Backend`].
//!
//! ## Quick Example
//!
//! ```
//! use active_contributors::aggregate::aggregate;
//! use active_contributors::collector::CollectionResult;
//! use active_contributors::identity::RawCommit;
//! use active_contributors::repo::RepoIdentifier;
//! use active_contributors::source::SourceType;
//!
//! let repo = RepoIdentifier::new(SourceType::Local, "team", None, "api");
//! let report = aggregate(vec![CollectionResult::commits(
//!     repo,
//!     vec![
//!         RawCommit::new("Alice", Some("alice@example.com"), 1_700_000_000_000),
//!         RawCommit::new("alice", Some("ALICE@example.com"), 1_700_000_100_000),
//!     ],
//! )]);
//! assert_eq!(report.contributor_count, 1);
//! ```
//!
//! ## Core Concepts
//!
//! - **Sources (`source`, `backends`)**: Bitbucket Cloud, Azure DevOps and
//!   local `git` checkouts, each described by a `SourceSpec` and implementing
//!   the `CommitSource` and `RepoDiscovery` traits.
//! - **Rules (`rules`, `resolver`)**: Organizations, projects and repositories
//!   to include or skip, expanded into a concrete repository set.
//! - **Collection (`collector`)**: Bounded parallel commit fetching with
//!   per-repository failure isolation.
//! - **Aggregation (`identity`, `aggregate`)**: Identity normalization and
//!   order-independent deduplication into the final report.
//!
//! ## Execution Flow
//!
//! [`runner::run`] ties the stages together:
//!
//! 1.  **Resolution**: Expand rules into repositories, applying skips.
//! 2.  **Collection**: Fetch commits since the cutoff from every repository.
//! 3.  **Aggregation**: Fold commits into distinct identities and record
//!     failures next to the count.

pub mod aggregate;
pub mod api;
pub mod backends;
pub mod collector;
pub mod error;
pub mod git;
pub mod identity;
pub mod output;
pub mod repo;
pub mod resolver;
pub mod rules;
pub mod runner;
pub mod since;
pub mod source;

#[cfg(test)]
mod identity_proptest;
