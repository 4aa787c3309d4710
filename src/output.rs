//! # Output
//!
//! Rendering of a [`RunReport`] for the terminal, plus the color settings
//! that control it.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use active_contributors::output::{render_text, OutputConfig, TextOptions};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! print!("{}", render_text(&report, &TextOptions::default(), &config));
//! ```

use std::env;
use std::fmt::Write;

use chrono::DateTime;
use console::Style;

use crate::error::Result;
use crate::runner::RunReport;

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always disabled.
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    fn style(&self, style: Style) -> Style {
        if self.use_color {
            style.force_styling(true)
        } else {
            Style::new().force_styling(false)
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Which optional sections the text report includes.
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    pub list_contributors: bool,
    pub list_repos: bool,
}

/// Renders the report as human-readable text.
///
/// The failure section is always shown when there are failures, so a
/// partial count is never presented as complete.
pub fn render_text(run: &RunReport, options: &TextOptions, config: &OutputConfig) -> String {
    let report = &run.report;
    let bold = config.style(Style::new().bold());
    let dim = config.style(Style::new().dim());
    let red = config.style(Style::new().red());
    let yellow = config.style(Style::new().yellow());

    let since = run.since.get(..10).unwrap_or(&run.since);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Active contributors since {} ({}): {}",
        since,
        run.source,
        bold.apply_to(report.contributor_count)
    );
    let _ = writeln!(out, "Repositories scanned: {}", report.repos.len());
    if report.is_partial() {
        let _ = writeln!(
            out,
            "{}",
            yellow.apply_to(format!(
                "Partial result: {} failure(s), the count may be incomplete",
                report.failures.len()
            ))
        );
    }

    if options.list_contributors && !report.contributors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", bold.apply_to("Contributors:"));
        for contributor in &report.contributors {
            let names: Vec<&str> = contributor.names.iter().map(String::as_str).collect();
            let _ = writeln!(
                out,
                "  {} ({}) - {} repo(s), last commit {}",
                contributor.key,
                names.join(", "),
                contributor.repos.len(),
                dim.apply_to(format_date(contributor.last_commit))
            );
        }
    }

    if options.list_repos && !report.repos.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", bold.apply_to("Repositories:"));
        for repo in &report.repos {
            let _ = writeln!(
                out,
                "  {} - {} commit(s), {} contributor(s)",
                repo.repo, repo.commits, repo.contributors
            );
        }
    }

    if report.is_partial() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", red.apply_to("Failures:"));
        for failure in &report.failures {
            let _ = writeln!(
                out,
                "  {} [{}] {}",
                failure.target, failure.kind, failure.message
            );
        }
    }

    out
}

/// Renders the full report as pretty-printed JSON.
pub fn render_json(run: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(run)?)
}

fn format_date(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| millis.to_string())
}
