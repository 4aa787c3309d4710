//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `active-contributors` command-line tool. Each backend has its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the backend's credentials and organization
//!   flags, derived using `clap`, flattening the shared flags from `common`.
//! - An `execute` function that builds the backend and hands it to
//!   `common::run_and_report`.

pub mod azuredevops;
pub mod bitbucket;
pub mod common;
pub mod local;
