//! # Local Command Implementation
//!
//! Counts contributors across `git` checkouts on disk laid out as
//! `root/directory/repo`. Each directory plays the role of an organization.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use active_contributors::backends::LocalBackend;
use active_contributors::rules::RuleInputs;
use active_contributors::source::SourceSpec;

use super::common::{run_and_report, CommonArgs};

/// Count contributors in local git repositories
#[derive(Args, Debug)]
pub struct LocalArgs {
    /// Root that repository paths are relative to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Comma-separated directories whose git repositories are all included.
    #[arg(long, value_name = "DIRS")]
    pub directories: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl LocalArgs {
    fn rule_inputs(&self) -> RuleInputs {
        RuleInputs {
            orgs: self.directories.clone(),
            ..self.common.rule_inputs()
        }
    }
}

/// Execute the `local` command.
pub fn execute(args: LocalArgs, color_flag: &str) -> Result<()> {
    let spec = SourceSpec::local(&args.root.to_string_lossy());
    let backend = LocalBackend::new(spec);
    run_and_report(&backend, &args.rule_inputs(), &args.common, color_flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: LocalArgs,
    }

    fn parse(extra: &[&str]) -> LocalArgs {
        let mut argv = vec!["local", "--quiet"];
        argv.extend_from_slice(extra);
        TestCli::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn test_directories_become_orgs() {
        let args = parse(&["--directories", "team", "--root", "/srv/git"]);
        assert_eq!(args.root, PathBuf::from("/srv/git"));
        assert_eq!(args.rule_inputs().orgs.as_deref(), Some("team"));
    }

    #[test]
    fn test_empty_rules_are_rejected() {
        let err = execute(parse(&[]), "never").unwrap_err();
        assert!(err
            .to_string()
            .contains("At least one of --directories, --repos, or --repo-file is required"));
    }

    #[test]
    fn test_missing_repo_is_partial_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("team")).unwrap();
        let root = temp_dir.path().to_string_lossy().to_string();

        let result = execute(parse(&["--root", &root, "--repos", "team/gone"]), "never");
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_since_is_rejected() {
        let err = execute(parse(&["--repos", "team/api", "--since", "yesterday"]), "never").unwrap_err();
        assert!(err.to_string().contains("Invalid cutoff date"));
    }
}
