//! # Azure DevOps Command Implementation
//!
//! Counts contributors across Azure DevOps repositories, addressed as
//! `organization/project/repo`. Organizations and projects can be included
//! wholesale; projects can also be skipped without being enumerated.

use anyhow::Result;
use clap::Args;

use active_contributors::backends::AzureDevOpsBackend;
use active_contributors::rules::RuleInputs;
use active_contributors::source::SourceSpec;

use super::common::{run_and_report, CommonArgs, HttpArgs};

/// Count contributors in Azure DevOps
#[derive(Args, Debug)]
pub struct AzureDevOpsArgs {
    /// Personal access token with Code (Read) scope.
    #[arg(short, long, env = "AZURE_DEVOPS_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub token: String,

    /// Comma-separated organizations whose projects are all included.
    #[arg(long, value_name = "ORGS")]
    pub orgs: Option<String>,

    /// Comma-separated projects to include, as `org/project` or bare `project`.
    #[arg(long, value_name = "PROJECTS")]
    pub projects: Option<String>,

    /// Comma-separated projects to skip, as `org/project` or bare `project`.
    #[arg(long, value_name = "PROJECTS")]
    pub skip_projects: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub http: HttpArgs,
}

impl AzureDevOpsArgs {
    fn rule_inputs(&self) -> RuleInputs {
        RuleInputs {
            orgs: self.orgs.clone(),
            projects: self.projects.clone(),
            skip_projects: self.skip_projects.clone(),
            ..self.common.rule_inputs()
        }
    }
}

/// Execute the `azuredevops` command.
pub fn execute(args: AzureDevOpsArgs, color_flag: &str) -> Result<()> {
    let spec = SourceSpec::azure_devops(args.http.url.clone(), &args.token);
    let backend = AzureDevOpsBackend::new(spec, &args.http.client_options())?;
    run_and_report(&backend, &args.rule_inputs(), &args.common, color_flag)
}
