//! Tasks shipped with lint-svn

use super::{Task, TaskContext, TaskFuture, TaskResult};
use crate::warning::Warning;
use regex::Regex;
use std::sync::LazyLock;

static CONFLICT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(<{7}|={7}|>{7}|\|{7})(\s|$)").expect("conflict marker regex is valid")
});

/// Read a matched file as text; binary or unreadable files are skipped
async fn read_text(ctx: &TaskContext, file: &str) -> Option<String> {
    match tokio::fs::read_to_string(ctx.resolve(file)).await {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::debug!("Skipping {}: {}", file, e);
            None
        }
    }
}

/// Reports files with trailing spaces or tabs (Low)
pub struct TrailingWhitespace;

impl Task for TrailingWhitespace {
    fn name(&self) -> &str {
        "trailing-whitespace"
    }

    fn run<'a>(&'a self, ctx: &'a TaskContext, files: &'a [String]) -> TaskFuture<'a> {
        Box::pin(async move {
            let mut warnings = Vec::new();
            for file in files {
                let Some(content) = read_text(ctx, file).await else {
                    continue;
                };
                let lines: Vec<usize> = content
                    .lines()
                    .enumerate()
                    .filter(|(_, line)| line.ends_with(' ') || line.ends_with('\t'))
                    .map(|(idx, _)| idx + 1)
                    .collect();
                if let Some(first) = lines.first() {
                    warnings.push(Warning::low(format!(
                        "{}:{}: trailing whitespace on {} line(s)",
                        file,
                        first,
                        lines.len()
                    )));
                }
            }
            Ok(TaskResult::from(warnings))
        })
    }
}

/// Reports files containing unresolved conflict markers (High)
pub struct ConflictMarkers;

impl Task for ConflictMarkers {
    fn name(&self) -> &str {
        "conflict-markers"
    }

    fn run<'a>(&'a self, ctx: &'a TaskContext, files: &'a [String]) -> TaskFuture<'a> {
        Box::pin(async move {
            let mut warnings = Vec::new();
            for file in files {
                let Some(content) = read_text(ctx, file).await else {
                    continue;
                };
                if let Some(found) = CONFLICT_MARKER.find(&content) {
                    let line = content[..found.start()].lines().count() + 1;
                    warnings.push(Warning::high(format!(
                        "{file}:{line}: unresolved conflict marker"
                    )));
                }
            }
            Ok(TaskResult::from(warnings))
        })
    }
}
