//! Pipeline orchestration.
//!
//! Wires resolution, collection and aggregation together:
//!
//! ```text
//! InclusionRules ─► resolve ─► CommitCollector::collect ─► aggregate ─► RunReport
//! ```
//!
//! Configuration errors abort the run. Every other failure ends up in the
//! report next to the count.

use chrono::{DateTime, SecondsFormat, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde::Serialize;

use crate::aggregate::{AggregateReport, ContributorAggregator};
use crate::backends::Backend;
use crate::collector::CommitCollector;
use crate::error::{Error, Result};
use crate::resolver;
use crate::rules::InclusionRules;
use crate::source::SourceType;

/// Run-wide settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub since: DateTime<Utc>,
    /// Worker-pool size; the backend default when absent
    pub concurrency: Option<usize>,
    pub show_progress: bool,
}

/// The report of one run, with the context needed to present it.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source: SourceType,
    /// RFC 3339 cutoff
    pub since: String,
    #[serde(flatten)]
    pub report: AggregateReport,
}

/// Counts active contributors for the repositories selected by `rules`.
pub fn run<B: Backend + ?Sized>(
    backend: &B,
    rules: &InclusionRules,
    options: &RunOptions,
) -> Result<RunReport> {
    let spec = backend.spec();

    let resolution = resolver::resolve(spec, rules, backend)?;

    let concurrency = options.concurrency.unwrap_or(spec.default_concurrency);
    let collector = CommitCollector::new(concurrency)
        .with_progress(progress_bar(resolution.repos.len(), options.show_progress));
    let results = collector.collect(&resolution.repos, options.since, backend)?;

    let mut aggregator = ContributorAggregator::new();
    for failure in resolution.failures {
        aggregator.add_failure(failure);
    }
    for result in results {
        aggregator.add(result);
    }
    let report = aggregator.finish();

    if let Some(fatal) = report.failures.iter().find(|f| f.kind.is_fatal()) {
        return Err(Error::config(format!("{}: {}", fatal.target, fatal.message)));
    }

    info!(
        "Counted {} active contributors across {} {}s",
        report.contributor_count,
        report.repos.len(),
        spec.repo_term
    );

    Ok(RunReport {
        source: spec.source_type,
        since: options.since.to_rfc3339_opts(SecondsFormat::Secs, true),
        report,
    })
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner} [{bar:40}] {pos}/{len} repos") {
        bar.set_style(style);
    }
    bar
}
