//! Glob pattern utilities
//!
//! Rule globs follow the usual lint-staged conventions: dot files are matched like
//! any other file, `*` never crosses a `/`, and a pattern without any `/` is
//! matched against the file's base name only, so `*.ts` matches at any depth.

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use std::path::Path;

/// A compiled rule glob
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: String,
    matcher: GlobMatcher,
    match_base: bool,
}

impl PatternMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .with_context(|| format!("Invalid glob pattern '{pattern}'"))?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
            match_base: !pattern.contains('/'),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Match a `/`-separated path relative to the lint root
    pub fn is_match(&self, path: &str) -> bool {
        let path = path.strip_prefix("./").unwrap_or(path);
        if self.match_base {
            self.matcher.is_match(base_name(path))
        } else {
            self.matcher.is_match(path)
        }
    }
}

/// Last path component of a `/` or `\` separated path
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Extension of the base name including the leading dot.
///
/// Dot files without a further dot (`.gitignore`) have no extension.
pub fn extension(path: &str) -> Option<&str> {
    let name = base_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx..]),
    }
}

/// Check if a string contains glob pattern characters
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[') || pattern.contains('{')
}

/// Expand a pattern to the files under `base_dir` it matches.
///
/// Hidden files are included while `.gitignore`/`.ignore` rules are honoured.
/// Returned paths are relative to `base_dir`, `/`-separated and sorted.
pub fn expand_glob_pattern<P: AsRef<Path>>(pattern: &str, base_dir: P) -> Result<Vec<String>> {
    let base_dir = base_dir.as_ref();

    if !is_glob_pattern(pattern) {
        let path = base_dir.join(pattern);
        return Ok(if path.is_file() {
            vec![pattern.replace('\\', "/")]
        } else {
            Vec::new()
        });
    }

    let matcher = PatternMatcher::new(pattern)?;
    let mut matching_paths = Vec::new();

    let walker = WalkBuilder::new(base_dir)
        .hidden(false)
        .git_ignore(true)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != ".svn" && entry.file_name() != ".git")
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(base_dir) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        if matcher.is_match(&relative) {
            matching_paths.push(relative);
        }
    }

    matching_paths.sort();
    Ok(matching_paths)
}

/// Files per independent lint run in `--glob` mode
pub const BATCH_SIZE: usize = 200;

/// Split `files` into consecutive batches of at most `size` entries
pub fn batches(files: Vec<String>, size: usize) -> Vec<Vec<String>> {
    files
        .chunks(size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}
