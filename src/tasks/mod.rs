//! In-process tasks
//!
//! A rule command may name an in-process task instead of an external program.
//! Tasks receive the matched files and report findings as [`Warning`]s through a
//! typed [`TaskResult`]. Returning `Err` means the task itself is broken rather
//! than the files it inspected, and aborts the whole run.
//!
//! Tasks are looked up by name in a [`TaskRegistry`] while the configuration is
//! validated:
//!
//! ```toml
//! [[rules]]
//! glob = "*.{js,ts}"
//! command = ["prettier --write", { builtin = "conflict-markers" }]
//! ```

pub mod builtin;

use crate::warning::Warning;
use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

/// Outcome of a task run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskResult {
    #[default]
    NoFindings,
    Findings(Vec<Warning>),
}

impl TaskResult {
    pub fn into_warnings(self) -> Vec<Warning> {
        match self {
            TaskResult::NoFindings => Vec::new(),
            TaskResult::Findings(warnings) => warnings,
        }
    }
}

impl From<Vec<Warning>> for TaskResult {
    fn from(warnings: Vec<Warning>) -> Self {
        if warnings.is_empty() {
            TaskResult::NoFindings
        } else {
            TaskResult::Findings(warnings)
        }
    }
}

/// Environment a task runs in
#[derive(Debug, Clone)]
pub struct TaskContext {
    root: PathBuf,
}

impl TaskContext {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Absolute location of a matched file, which is relative to the lint root
    pub fn resolve(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }
}

pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = Result<TaskResult>> + Send + 'a>>;

/// An in-process lint task
pub trait Task: Send + Sync {
    fn name(&self) -> &str;

    fn run<'a>(&'a self, ctx: &'a TaskContext, files: &'a [String]) -> TaskFuture<'a>;
}

impl std::fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task({})", self.name())
    }
}

/// Named tasks available to rule commands
#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, Arc<dyn Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the tasks shipped with lint-svn
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(builtin::TrailingWhitespace));
        registry.register(Arc::new(builtin::ConflictMarkers));
        registry
    }

    /// Add a task, replacing any task registered under the same name
    pub fn register(&mut self, task: Arc<dyn Task>) {
        self.tasks.insert(task.name().to_string(), task);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Task>> {
        match self.tasks.get(name) {
            Some(task) => Ok(task.clone()),
            None => bail!(
                "Unknown builtin task '{}' (available: {})",
                name,
                self.names().join(", ")
            ),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.tasks.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry").field("tasks", &self.names()).finish()
    }
}
