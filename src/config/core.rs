use super::overrides::CliOverrides;
use super::rules::{Config, RawConfig};
use super::smart_load;
use crate::tasks::TaskRegistry;
use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::path::{Path, PathBuf};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// File names probed in every directory from the start directory upwards
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".lintsvnrc.toml",
    "lint-svn.toml",
    ".lintsvnrc.json",
    "lint-svn.json",
    ".lintsvnrc.yaml",
    ".lintsvnrc.yml",
    "lint-svn.yaml",
    "lint-svn.yml",
];

pub const ENV_PREFIX: &str = "LINT_SVN_";

/// Layered configuration: embedded defaults, the config file, `LINT_SVN_*`
/// environment variables and finally command line overrides.
pub struct LintSvnConfig {
    figment: Figment,
    path: PathBuf,
}

impl LintSvnConfig {
    /// Load configuration, discovering the config file from the current directory
    pub fn load(custom_config: Option<&Path>, overrides: CliOverrides) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::load_from(&cwd, custom_config, overrides)
    }

    /// Load configuration, discovering the config file from `start`
    pub fn load_from(
        start: &Path,
        custom_config: Option<&Path>,
        overrides: CliOverrides,
    ) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting from {}", start.display());

        let path = match custom_config {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    start.join(path)
                };
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                path
            }
            None => match Self::find_config_file(start) {
                Some(path) => path,
                None => bail!(
                    "No lint-svn configuration found in {} or any parent directory (looked for {})",
                    start.display(),
                    CONFIG_FILE_NAMES.join(", ")
                ),
            },
        };
        tracing::debug!("Using config file {}", path.display());

        let mut figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(smart_load::auto(&path))
            .merge(Env::prefixed(ENV_PREFIX));

        if !overrides.is_empty() {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides {:?}", overrides);
            figment = figment.merge(Serialized::defaults(overrides));
        }

        Ok(Self { figment, path })
    }

    /// Find the first config file in `start` or any of its ancestors
    pub fn find_config_file(start: &Path) -> Option<PathBuf> {
        start.ancestors().find_map(|dir| {
            CONFIG_FILE_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
        })
    }

    /// The config file in use
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory holding the config file
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// The merged configuration before validation
    pub fn raw(&self) -> Result<RawConfig> {
        self.figment
            .extract()
            .with_context(|| format!("Failed to parse config file: {}", self.path.display()))
    }

    /// The merged, validated configuration
    pub fn config(&self, tasks: &TaskRegistry) -> Result<Config> {
        self.raw()?
            .validate(tasks)
            .with_context(|| format!("Invalid config file: {}", self.path.display()))
    }
}
