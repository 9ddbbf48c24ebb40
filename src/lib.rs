//! # lint-svn - run linters against a Subversion working copy
//!
//! lint-svn asks `svn status` which files changed, matches them against the
//! rules of a project configuration and runs each rule's command (an external
//! tool or a builtin task) on the matching files. Failures are collected as
//! severity-tagged warnings and the number of high and medium warnings becomes
//! the process exit code, so the tool drops straight into pre-commit scripts.
//!
//! ## Quick Start
//!
//! ```toml
//! # lint-svn.toml
//! ignore_extensions = [".dll", ".map"]
//! concurrency = 4
//!
//! [[rules]]
//! glob = "src/**/*.js"
//! command = "eslint --fix"
//!
//! [[rules]]
//! glob = "*"
//! command = { builtin = "conflict-markers" }
//! ```
//!
//! ```bash
//! lint-svn            # lint changed files
//! lint-svn -g "*.js"  # lint every matching file under the config directory
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod shared;
pub mod svn;
pub mod tasks;
pub mod warning;

pub use cli::{Cli, Output};
pub use config::{Config, LintSvnConfig};
pub use warning::{Severity, Warning, WarningReport};

/// Result type alias for lint-svn operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
