//! # Bitbucket Command Implementation
//!
//! Counts contributors across Bitbucket Cloud repositories. Repositories are
//! addressed as `workspace/repo`; `--workspaces` expands every repository of
//! the listed workspaces.

use anyhow::Result;
use clap::Args;

use active_contributors::backends::BitbucketBackend;
use active_contributors::rules::RuleInputs;
use active_contributors::source::SourceSpec;

use super::common::{run_and_report, CommonArgs, HttpArgs};

/// Count contributors in Bitbucket Cloud
#[derive(Args, Debug)]
pub struct BitbucketArgs {
    /// Bitbucket username.
    #[arg(short, long, env = "BITBUCKET_USERNAME", value_name = "USER")]
    pub username: String,

    /// Bitbucket app password.
    #[arg(short, long, env = "BITBUCKET_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub token: String,

    /// Comma-separated workspaces whose repositories are all included.
    #[arg(long, value_name = "WORKSPACES")]
    pub workspaces: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub http: HttpArgs,
}

impl BitbucketArgs {
    fn rule_inputs(&self) -> RuleInputs {
        RuleInputs {
            orgs: self.workspaces.clone(),
            ..self.common.rule_inputs()
        }
    }
}

/// Execute the `bitbucket` command.
pub fn execute(args: BitbucketArgs, color_flag: &str) -> Result<()> {
    let spec = SourceSpec::bitbucket(args.http.url.clone(), &args.username, &args.token);
    let backend = BitbucketBackend::new(spec, &args.http.client_options())?;
    run_and_report(&backend, &args.rule_inputs(), &args.common, color_flag)
}
