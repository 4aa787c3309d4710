//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Active Contributors - Count the people committing to your repositories
#[derive(Parser, Debug)]
#[command(name = "active-contributors")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count contributors across Bitbucket Cloud workspaces and repositories
    Bitbucket(commands::bitbucket::BitbucketArgs),

    /// Count contributors across Azure DevOps organizations, projects and repositories
    Azuredevops(commands::azuredevops::AzureDevOpsArgs),

    /// Count contributors across git checkouts on disk
    Local(commands::local::LocalArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Bitbucket(args) => commands::bitbucket::execute(args, &self.color),
            Commands::Azuredevops(args) => commands::azuredevops::execute(args, &self.color),
            Commands::Local(args) => commands::local::execute(args, &self.color),
        }
    }
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when running under a test harness.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
