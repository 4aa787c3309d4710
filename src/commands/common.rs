//! Flags and reporting shared by every backend subcommand.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::{Args, ValueEnum};

use active_contributors::api::ClientOptions;
use active_contributors::backends::Backend;
use active_contributors::output::{render_json, render_text, OutputConfig, TextOptions};
use active_contributors::rules::{InclusionRules, RuleInputs};
use active_contributors::runner::{self, RunOptions};
use active_contributors::since::parse_since;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// The full report as JSON
    Json,
}

/// Repository selection and reporting flags.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Comma-separated repository paths to include.
    #[arg(long, value_name = "PATHS")]
    pub repos: Option<String>,

    /// Comma-separated repository paths to skip.
    #[arg(long, value_name = "PATHS")]
    pub skip_repos: Option<String>,

    /// File with one repository path per line (`#` starts a comment).
    #[arg(long, value_name = "FILE")]
    pub repo_file: Option<PathBuf>,

    /// Count commits since this date: YYYY-MM-DD, RFC 3339, or relative (90d, 3m).
    #[arg(long, value_name = "DATE", default_value = "90d")]
    pub since: String,

    /// Number of repositories fetched at once.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// List every contributor in text output.
    #[arg(long)]
    pub list_contributors: bool,

    /// List every scanned repository in text output.
    #[arg(long)]
    pub list_repos: bool,

    /// Hide the progress bar.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Transport flags for the HTTP backends.
#[derive(Args, Debug, Clone)]
pub struct HttpArgs {
    /// Override the API base URL.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Extra PEM CA certificate to trust.
    #[arg(long, value_name = "FILE")]
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,
}

impl HttpArgs {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.timeout),
            ca_cert: self.ca_cert.clone(),
            ..ClientOptions::default()
        }
    }
}

impl CommonArgs {
    /// Rule input with this command's repository flags filled in.
    pub fn rule_inputs(&self) -> RuleInputs {
        RuleInputs {
            repos: self.repos.clone(),
            skip_repos: self.skip_repos.clone(),
            repo_file: self.repo_file.clone(),
            ..RuleInputs::default()
        }
    }
}

/// Runs the count against `backend` and prints the report to stdout.
///
/// Only configuration problems return an error; per-repository failures are
/// part of the printed report.
pub fn run_and_report<B: Backend + ?Sized>(
    backend: &B,
    inputs: &RuleInputs,
    args: &CommonArgs,
    color_flag: &str,
) -> Result<()> {
    let since = parse_since(&args.since, Utc::now())?;
    let rules = InclusionRules::from_inputs(backend.spec(), inputs)?;
    let options = RunOptions {
        since,
        concurrency: args.concurrency,
        show_progress: !args.quiet && console::Term::stderr().is_term(),
    };

    let report = runner::run(backend, &rules, &options)?;

    match args.output {
        OutputFormat::Json => println!("{}", render_json(&report)?),
        OutputFormat::Text => {
            let out = OutputConfig::from_env_and_flag(color_flag);
            let text_options = TextOptions {
                list_contributors: args.list_contributors,
                list_repos: args.list_repos,
            };
            print!("{}", render_text(&report, &text_options, &out));
        }
    }

    Ok(())
}
