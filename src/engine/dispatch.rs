//! Command dispatch
//!
//! Executes a rule's command definition against its matched files:
//! - shell commands are spawned directly (no shell) with every matched file
//!   appended as its own argument,
//! - in-process tasks are awaited and their findings collected,
//! - sequences run their steps one after another, concatenating warnings.
//!
//! A failing command becomes a [`Warning`] and never stops later steps. Only a
//! broken in-process task (one returning `Err`) aborts dispatch.

use crate::cli::Output;
use crate::tasks::{Task, TaskContext};
use crate::warning::Warning;
use anyhow::{Context, Result};
use console::style;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Package managers whose `run`-style invocations need `--` before file arguments
pub const PACKAGE_MANAGERS: &[&str] = &["npm", "pnpm", "yarn", "bun"];

/// An external program with its leading arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    raw: String,
    program: String,
    args: Vec<String>,
}

impl ShellCommand {
    /// Split a command string on whitespace; the first token is the program.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut tokens = raw.split_whitespace().map(str::to_string);
        let program = tokens
            .next()
            .with_context(|| format!("Command '{raw}' is empty"))?;

        Ok(Self {
            raw: raw.trim().to_string(),
            program,
            args: tokens.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }

    /// Package manager commands must separate their own flags from the
    /// program's with `--`, otherwise appended files would go to the manager.
    pub fn check_separator(&self) -> std::result::Result<(), String> {
        let manager = self.tokens().find(|t| PACKAGE_MANAGERS.contains(t));
        match manager {
            Some(manager) if !self.tokens().any(|t| t == "--") => Err(format!(
                "Invalid command '{}': {} commands must postfix with -- before file arguments",
                self.raw, manager
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A single element of a command definition
#[derive(Debug, Clone)]
pub enum CommandStep {
    Shell(ShellCommand),
    Task(Arc<dyn Task>),
}

/// What a rule runs against its matched files
#[derive(Debug, Clone)]
pub enum CommandDefinition {
    Shell(ShellCommand),
    Task(Arc<dyn Task>),
    Sequence(Vec<CommandStep>),
}

impl CommandDefinition {
    /// Steps in execution order
    pub fn steps(&self) -> Vec<CommandStep> {
        match self {
            CommandDefinition::Shell(cmd) => vec![CommandStep::Shell(cmd.clone())],
            CommandDefinition::Task(task) => vec![CommandStep::Task(task.clone())],
            CommandDefinition::Sequence(steps) => steps.clone(),
        }
    }
}

/// Runs command definitions for matched files
#[derive(Debug, Clone)]
pub struct Dispatcher {
    root: PathBuf,
    output: Output,
}

impl Dispatcher {
    pub fn new<P: AsRef<Path>>(root: P, output: Output) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            output,
        }
    }

    /// Execute `command` for `files`, returning warnings in step order
    pub async fn dispatch(
        &self,
        command: &CommandDefinition,
        files: &[String],
        glob: &str,
    ) -> Result<Vec<Warning>> {
        let mut warnings = Vec::new();
        for step in command.steps() {
            let step_warnings = match &step {
                CommandStep::Shell(cmd) => self.run_shell(cmd, files, glob).await,
                CommandStep::Task(task) => self.run_task(task.as_ref(), files).await?,
            };
            warnings.extend(step_warnings);
        }
        Ok(warnings)
    }

    async fn run_shell(&self, cmd: &ShellCommand, files: &[String], glob: &str) -> Vec<Warning> {
        if let Err(message) = cmd.check_separator() {
            return vec![Warning::high(message)];
        }

        // Resolve through PATH so Windows .cmd shims are found
        let program = which::which_in(cmd.program(), std::env::var_os("PATH"), &self.root)
            .unwrap_or_else(|_| PathBuf::from(cmd.program()));

        tracing::debug!("Running {} with {} files", cmd, files.len());
        let result = Command::new(&program)
            .args(cmd.args())
            .args(files)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("Failed to spawn {}: {}", cmd.program(), e);
                return vec![Warning::new(format!(
                    "Command failed to spawn: {}: {}",
                    cmd.program(),
                    e
                ))];
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none (terminated by signal)".to_string());
            let mut message = format!(
                "Command failed with exit code {}: {} {}",
                code,
                cmd,
                files.join(" ")
            );
            for stream in [stderr.trim(), stdout.trim()] {
                if !stream.is_empty() {
                    message.push('\n');
                    message.push_str(stream);
                }
            }
            return vec![Warning::new(message)];
        }

        if !stdout.trim().is_empty() {
            self.output.verbose(stdout.trim());
        }
        let friendly = style(format!("{} [... {} files]", cmd, files.len())).on_green();
        self.output.success(&format!(
            "Linted: {} matching {}.",
            friendly,
            style(glob).on_green()
        ));
        Vec::new()
    }

    async fn run_task(&self, task: &dyn Task, files: &[String]) -> Result<Vec<Warning>> {
        let ctx = TaskContext::new(&self.root);
        let result = task
            .run(&ctx, files)
            .await
            .with_context(|| format!("Task '{}' failed", task.name()))?;
        Ok(result.into_warnings())
    }
}
