//! # Error Handling
//!
//! This module defines the centralized error type for `active-contributors`.
//! It uses `thiserror` to build an `Error` enum whose variants mirror the
//! failure taxonomy of a counting run:
//!
//! - **`Configuration`**: invalid or absent inclusion criteria, a malformed
//!   repository path or cutoff date. Fatal; raised before any network or
//!   process activity.
//! - **`Authorization`**: the credential was rejected for one repository or
//!   discovery target. Recorded and skipped.
//! - **`Transport`**: network failure, timeout, exhausted rate-limit retries or
//!   a failing `git` process. Recorded and skipped.
//! - **`NotFound`**: the repository vanished or is not visible. Recorded and
//!   skipped.
//! - **`Parse`**: a backend answered with output that breaks its contract
//!   (malformed `git log` output, undecodable JSON). Recorded and skipped.
//!
//! Wrapped library errors (`Io`, `Json`, `UrlParse`) cover the remaining
//! plumbing. [`Error::failure_kind`] maps any error onto the [`FailureKind`]
//! that is reported to the user.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main error type for active-contributors operations
#[derive(Error, Debug)]
pub enum Error {
    /// The run is misconfigured and cannot start.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Configuration {
        message: String,
        /// Optional hint for how to fix the configuration
        hint: Option<String>,
    },

    /// The credential does not grant access to the target.
    #[error("Authorization error for {target}: {message}")]
    Authorization { target: String, message: String },

    /// A network request or external process failed.
    #[error("Transport error for {target}: {message}")]
    Transport { target: String, message: String },

    /// The target does not exist or is not visible to the credential.
    #[error("Not found: {target}: {message}")]
    NotFound { target: String, message: String },

    /// A backend produced output that could not be parsed.
    #[error("Parse error for {target}: {message}")]
    Parse { target: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for a `Configuration` error without a hint.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            hint: None,
        }
    }

    /// Shorthand for a `Configuration` error carrying a hint.
    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Classifies this error for the report.
    ///
    /// Wrapped I/O, JSON and URL errors surfacing from a backend are treated
    /// as transport and parse failures respectively.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::Configuration { .. } | Error::UrlParse(_) => FailureKind::Configuration,
            Error::Authorization { .. } => FailureKind::Authorization,
            Error::Transport { .. } | Error::Io(_) => FailureKind::Transport,
            Error::NotFound { .. } => FailureKind::NotFound,
            Error::Parse { .. } | Error::Json(_) => FailureKind::Parse,
        }
    }

    /// The detail message without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            Error::Configuration { message, .. }
            | Error::Authorization { message, .. }
            | Error::Transport { message, .. }
            | Error::NotFound { message, .. }
            | Error::Parse { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// The kind of failure recorded against a repository or discovery target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Configuration,
    Authorization,
    Transport,
    NotFound,
    Parse,
}

impl FailureKind {
    /// Whether a failure of this kind aborts the whole run instead of
    /// skipping the affected repository.
    pub fn is_fatal(self) -> bool {
        matches!(self, FailureKind::Configuration)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Configuration => "configuration",
            FailureKind::Authorization => "authorization",
            FailureKind::Transport => "transport",
            FailureKind::NotFound => "not-found",
            FailureKind::Parse => "parse",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure recorded in the report instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Failure {
    /// Repository path, or the organization or project that could not be
    /// enumerated
    pub target: String,
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn from_error(target: impl Into<String>, error: &Error) -> Self {
        Self {
            target: target.into(),
            kind: error.failure_kind(),
            message: error.detail(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
