//! Command-line interface for lint-svn
//!
//! Without `--glob` the files to lint come from `svn status` in the current
//! directory. With `--glob` they come from walking the directory holding the
//! config file, in batches of [`BATCH_SIZE`] files.

use crate::config::{CliOverrides, Config, ConfigFormat, LintSvnConfig};
use crate::engine::Linter;
use crate::shared::glob::{BATCH_SIZE, batches, expand_glob_pattern};
use crate::svn::{FileSet, SvnStatusProvider};
use crate::tasks::TaskRegistry;
use crate::warning::{WarningReport, process_exit_code};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

mod output;

pub use output::Output;

/// Run linters and formatters against changed files in a Subversion working copy
#[derive(Parser, Debug)]
#[command(name = "lint-svn", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Lint files matching GLOB under the config directory instead of svn changes
    #[arg(short, long, value_name = "GLOB")]
    pub glob: Option<String>,

    /// Print how many files each rule matched
    #[arg(short, long)]
    pub debug: bool,

    /// Maximum number of rules run at the same time
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the resolved configuration and exit
    #[arg(long)]
    pub print_config: bool,

    /// Format used by --print-config
    #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
    pub format: ConfigFormat,
}

impl Cli {
    /// Execute a lint run and return the process exit status
    pub async fn run(self) -> Result<i32> {
        setup_logging(self.verbose, self.quiet);
        tracing::debug!("lint-svn {}", crate::VERSION);
        let output = Output::new(self.verbose > 0, self.quiet);

        let overrides = CliOverrides {
            concurrency: self.concurrency,
        };
        let loaded = LintSvnConfig::load(self.config.as_deref(), overrides)?;

        if self.print_config {
            print!("{}", loaded.export_config(self.format)?);
            return Ok(0);
        }

        let tasks = TaskRegistry::with_builtins();
        let config = loaded.config(&tasks)?;
        tracing::info!(
            "Loaded {} rules from {} (concurrency {})",
            config.rules.len(),
            loaded.path().display(),
            config.concurrency
        );

        let report = match &self.glob {
            Some(glob) => self.lint_glob(config, loaded.root(), glob, output).await?,
            None => self.lint_working_copy(config, output).await?,
        };

        let counts = report.print();
        Ok(process_exit_code(&counts))
    }

    async fn lint_working_copy(&self, config: Config, output: Output) -> Result<WarningReport> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let provider = SvnStatusProvider::new(&cwd)?;
        let files = provider.file_set().await?;
        tracing::info!(
            "{} changed and {} unversioned files",
            files.changed.len(),
            files.untracked.len()
        );
        if files.is_empty() {
            output.info("No changed files to lint");
        }

        let linter = Linter::new(config, &cwd, output).with_debug(self.debug);
        Ok(WarningReport::new(linter.lint(&files).await?))
    }

    async fn lint_glob(
        &self,
        config: Config,
        root: &Path,
        glob: &str,
        output: Output,
    ) -> Result<WarningReport> {
        let files = expand_glob_pattern(glob, root)?;
        output.info(&format!("{} files matching: {}", files.len(), glob));

        let linter = Linter::new(config, root, output).with_debug(self.debug);
        let mut report = WarningReport::default();
        for (index, batch) in batches(files, BATCH_SIZE).into_iter().enumerate() {
            tracing::debug!("Linting batch {} ({} files)", index + 1, batch.len());
            report.extend(linter.lint(&FileSet::explicit(batch)).await?);
        }
        Ok(report)
    }
}

/// Initialise the tracing subscriber; `RUST_LOG` takes precedence over `-v`
pub fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,ignore=warn,globset=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn,globset=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
