//! Subversion integration
//!
//! Lint-svn never talks to the repository itself; it only asks the `svn` client
//! for the status of the working copy and classifies the result.

pub mod status;

pub use status::{FileSet, FileStatusRecord, StatusKind, parse_status_output};

use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Reads working copy status through the `svn` command line client
pub struct SvnStatusProvider {
    svn: PathBuf,
    root: PathBuf,
}

impl SvnStatusProvider {
    /// Locate the `svn` client and bind the provider to a working copy directory
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let svn = which::which("svn").map_err(|_| {
            anyhow!("This command requires svn. Please install a Subversion command line client")
        })?;

        Ok(Self {
            svn,
            root: root.as_ref().to_path_buf(),
        })
    }

    /// Run `svn status` and parse its output, in the client's order
    pub async fn fetch(&self) -> Result<Vec<FileStatusRecord>> {
        tracing::debug!("Running svn status in {}", self.root.display());

        let output = Command::new(&self.svn)
            .arg("status")
            .current_dir(&self.root)
            .output()
            .await
            .context("Failed to execute svn status")?;

        if !output.status.success() {
            return Err(anyhow!(
                "svn status failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let records = parse_status_output(&stdout);
        tracing::debug!("svn status reported {} entries", records.len());
        Ok(records)
    }

    /// Fetch status and partition it into changed and untracked files
    pub async fn file_set(&self) -> Result<FileSet> {
        let records = self.fetch().await?;
        Ok(FileSet::classify(&records))
    }
}
