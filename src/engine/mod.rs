//! Rule matching and concurrent execution
//!
//! One lint run takes the classified working copy files and, for every configured
//! rule, selects the matching files and dispatches the rule's command for them.
//! Rules are scheduled through a [`ConcurrencyLimiter`]; the run settles only when
//! every rule has finished, and a failing rule never cancels the others.
//!
//! ```text
//! FileSet ──▶ RuleMatcher ──▶ ConcurrencyLimiter ──▶ Dispatcher ──▶ Vec<Warning>
//!             (per rule)      (config.concurrency)    (shell/task)
//! ```
//!
//! Warnings are returned grouped by rule in declaration order; within a rule they
//! keep the order of the rule's command steps.

pub mod dispatch;
pub mod limiter;
pub mod matcher;

pub use dispatch::{CommandDefinition, CommandStep, Dispatcher, ShellCommand};
pub use limiter::ConcurrencyLimiter;
pub use matcher::RuleMatcher;

use crate::cli::Output;
use crate::config::Config;
use crate::svn::FileSet;
use crate::warning::Warning;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Drives lint runs for a validated configuration
pub struct Linter {
    config: Arc<Config>,
    matcher: Arc<RuleMatcher>,
    dispatcher: Dispatcher,
    output: Output,
    debug: bool,
}

impl Linter {
    pub fn new<P: AsRef<Path>>(config: Config, root: P, output: Output) -> Self {
        let matcher = RuleMatcher::new(config.ignore_extensions.clone());
        Self {
            config: Arc::new(config),
            matcher: Arc::new(matcher),
            dispatcher: Dispatcher::new(root, output),
            output,
            debug: false,
        }
    }

    /// Report how many files each rule matched
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Run every rule against `files` and collect the resulting warnings
    pub async fn lint(&self, files: &FileSet) -> Result<Vec<Warning>> {
        let limiter = ConcurrencyLimiter::new(self.config.concurrency);
        self.lint_with(&limiter, files).await
    }

    /// Like [`Linter::lint`], scheduling rules on a caller-provided limiter
    pub async fn lint_with(
        &self,
        limiter: &ConcurrencyLimiter,
        files: &FileSet,
    ) -> Result<Vec<Warning>> {
        let files = Arc::new(files.clone());
        let jobs: Vec<_> = (0..self.config.rules.len())
            .map(|index| {
                let config = self.config.clone();
                let matcher = self.matcher.clone();
                let dispatcher = self.dispatcher.clone();
                let files = files.clone();
                let output = self.output;
                let debug = self.debug;
                async move {
                    let rule = &config.rules[index];
                    if rule.skip {
                        tracing::debug!("Skipping rule {}", rule.glob.pattern());
                        return Ok(Vec::new());
                    }

                    let matched = matcher.select(rule, &files);
                    tracing::debug!("Rule {} matched {} files", rule.glob.pattern(), matched.len());
                    if debug {
                        output.info(&format!(
                            "Matched {} for rule: {} -> {}",
                            matched.len(),
                            rule.glob.pattern(),
                            rule.describe_command()
                        ));
                    }

                    if matched.is_empty() {
                        return Ok(Vec::new());
                    }
                    dispatcher
                        .dispatch(&rule.command, &matched, rule.glob.pattern())
                        .await
                }
            })
            .collect();

        let per_rule = limiter.run_all(jobs).await?;
        Ok(per_rule.into_iter().flatten().collect())
    }
}
