//! Configuration loading and validation
//!
//! Configuration is discovered by walking up from the working directory, layered
//! with figment (embedded defaults, config file, `LINT_SVN_*` environment, CLI
//! flags) and validated into a [`Config`] before any rule runs.

pub mod core;
pub mod formats;
pub mod overrides;
pub mod rules;
pub mod smart_load;

pub use self::core::{CONFIG_FILE_NAMES, LintSvnConfig};
pub use formats::ConfigFormat;
pub use overrides::CliOverrides;
pub use rules::{CommandSpec, Config, RawConfig, RawRule, Rule, StepSpec};
