//! Working copy status records and their classification
//!
//! `svn status` reports one line per interesting path. The first column carries
//! the item status; the path starts after the seven status columns and a space.

/// Per-file status reported by Subversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Added,
    Modified,
    Missing,
    Unversioned,
    Deleted,
    Normal,
    /// Directory pulled in through `svn:externals`
    External,
    Unknown,
}

impl StatusKind {
    /// Map a `svn status` item code onto a status kind
    pub fn from_code(code: char) -> Self {
        match code {
            'A' => StatusKind::Added,
            'M' => StatusKind::Modified,
            '!' => StatusKind::Missing,
            '?' => StatusKind::Unversioned,
            'D' => StatusKind::Deleted,
            ' ' => StatusKind::Normal,
            'X' => StatusKind::External,
            _ => StatusKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatusRecord {
    pub path: String,
    pub status: StatusKind,
}

impl FileStatusRecord {
    pub fn new(path: impl Into<String>, status: StatusKind) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

/// Width of the status columns preceding the path
const STATUS_COLUMNS: usize = 8;

/// Parse the stdout of `svn status` into status records, preserving order.
pub fn parse_status_output(stdout: &str) -> Vec<FileStatusRecord> {
    stdout.lines().filter_map(parse_status_line).collect()
}

fn parse_status_line(line: &str) -> Option<FileStatusRecord> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty()
        || line.starts_with("Performing status on external item")
        || line.starts_with("Summary of conflicts")
        || (line.starts_with("  ") && line.trim_start().contains("conflicts:"))
    {
        return None;
    }

    let code = line.chars().next()?;
    let path = match line.get(STATUS_COLUMNS..) {
        Some(rest) if line.get(STATUS_COLUMNS - 1..STATUS_COLUMNS) == Some(" ") => rest.trim(),
        // Older clients and hand-written fixtures separate with arbitrary whitespace
        _ => line.get(code.len_utf8()..)?.trim(),
    };
    if path.is_empty() {
        tracing::debug!("Skipping svn status line without a path: {:?}", line);
        return None;
    }

    let status = StatusKind::from_code(code);
    if status == StatusKind::Unknown {
        tracing::debug!("Unrecognized svn status code '{}' for {}", code, path);
    }

    Some(FileStatusRecord::new(path.replace('\\', "/"), status))
}

/// Files eligible for linting, partitioned by status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    /// Added or modified versioned files
    pub changed: Vec<String>,
    /// Unversioned files
    pub untracked: Vec<String>,
}

impl FileSet {
    /// Partition status records into changed and untracked files in one pass
    pub fn classify(records: &[FileStatusRecord]) -> Self {
        let mut set = FileSet::default();
        for record in records {
            match record.status {
                StatusKind::Added | StatusKind::Modified => set.changed.push(record.path.clone()),
                StatusKind::Unversioned => set.untracked.push(record.path.clone()),
                _ => {}
            }
        }
        set
    }

    /// A file set for explicitly listed files; there are no untracked files
    pub fn explicit(files: Vec<String>) -> Self {
        Self {
            changed: files,
            untracked: Vec::new(),
        }
    }

    pub fn source(&self, non_versioned: bool) -> &[String] {
        if non_versioned {
            &self.untracked
        } else {
            &self.changed
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.untracked.is_empty()
    }
}
