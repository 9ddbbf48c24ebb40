//! Configuration schema and validation
//!
//! The file schema ([`RawConfig`]) is what serde reads. It is validated once,
//! at load time, into a [`Config`]: globs are compiled, command strings are
//! split, builtin task names are resolved against a [`TaskRegistry`], and any
//! problem aborts the run before a single command is executed.

use crate::engine::{CommandDefinition, CommandStep, ShellCommand};
use crate::shared::glob::PatternMatcher;
use crate::tasks::TaskRegistry;
use anyhow::{Context, Result, anyhow, bail, ensure};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConfig {
    /// Extensions (with leading dot) that are never linted
    #[serde(default, alias = "ignoreExtensions")]
    pub ignore_extensions: Vec<String>,

    /// Maximum number of rules dispatched at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    pub rules: Vec<RawRule>,
}

fn default_concurrency() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRule {
    pub glob: String,

    pub command: CommandSpec,

    #[serde(default, skip_serializing_if = "is_false")]
    pub skip: bool,

    /// Match against unversioned files instead of changed ones
    #[serde(default, alias = "nonVersioned", skip_serializing_if = "is_false")]
    pub non_versioned: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A command as written: a string, a builtin task reference, or a list of either
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Shell(String),
    Builtin { builtin: String },
    Sequence(Vec<StepSpec>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepSpec {
    Shell(String),
    Builtin { builtin: String },
}

/// A validated rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub glob: PatternMatcher,
    pub command: CommandDefinition,
    pub skip: bool,
    pub non_versioned: bool,
}

impl Rule {
    /// Human readable command summary for logs
    pub fn describe_command(&self) -> String {
        let describe = |step: &CommandStep| match step {
            CommandStep::Shell(cmd) => cmd.to_string(),
            CommandStep::Task(task) => format!("builtin:{}", task.name()),
        };
        match &self.command {
            CommandDefinition::Shell(cmd) => cmd.to_string(),
            CommandDefinition::Task(task) => format!("builtin:{}", task.name()),
            CommandDefinition::Sequence(steps) => {
                let parts: Vec<String> = steps.iter().map(describe).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

/// A validated configuration, read-only for the rest of the run
#[derive(Debug, Clone)]
pub struct Config {
    pub ignore_extensions: HashSet<String>,
    pub concurrency: usize,
    pub rules: Vec<Rule>,
}

impl RawConfig {
    /// Validate and resolve into a [`Config`]
    pub fn validate(&self, tasks: &TaskRegistry) -> Result<Config> {
        ensure!(self.concurrency >= 1, "concurrency must be at least 1");
        ensure!(!self.rules.is_empty(), "rules not defined in config");

        let ignore_extensions = self
            .ignore_extensions
            .iter()
            .map(|ext| ext.trim())
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                if ext.starts_with('.') {
                    ext.to_string()
                } else {
                    format!(".{ext}")
                }
            })
            .collect();

        let rules = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                rule.validate(tasks)
                    .with_context(|| format!("Invalid rule #{} (glob '{}')", index + 1, rule.glob))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Config {
            ignore_extensions,
            concurrency: self.concurrency,
            rules,
        })
    }
}

impl RawRule {
    fn validate(&self, tasks: &TaskRegistry) -> Result<Rule> {
        ensure!(!self.glob.trim().is_empty(), "rule.glob not defined");
        let glob = PatternMatcher::new(self.glob.trim())?;

        let command = match &self.command {
            CommandSpec::Shell(raw) => CommandDefinition::Shell(shell_command(raw)?),
            CommandSpec::Builtin { builtin } => CommandDefinition::Task(tasks.get(builtin)?),
            CommandSpec::Sequence(steps) => {
                ensure!(!steps.is_empty(), "rule.command not defined");
                let steps = steps
                    .iter()
                    .map(|step| match step {
                        StepSpec::Shell(raw) => shell_command(raw).map(CommandStep::Shell),
                        StepSpec::Builtin { builtin } => tasks.get(builtin).map(CommandStep::Task),
                    })
                    .collect::<Result<Vec<_>>>()?;
                CommandDefinition::Sequence(steps)
            }
        };

        Ok(Rule {
            glob,
            command,
            skip: self.skip,
            non_versioned: self.non_versioned,
        })
    }
}

fn shell_command(raw: &str) -> Result<ShellCommand> {
    if raw.trim().is_empty() {
        bail!("rule.command not defined");
    }
    let cmd = ShellCommand::parse(raw)?;
    cmd.check_separator().map_err(|message| anyhow!(message))?;
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> RawConfig {
        toml::from_str(toml_str).expect("valid toml")
    }

    fn validate(toml_str: &str) -> Result<Config> {
        parse(toml_str).validate(&TaskRegistry::with_builtins())
    }

    #[test]
    fn test_command_shapes() {
        let config = validate(
            r#"
            ignore_extensions = [".dll", "map"]
            concurrency = 5

            [[rules]]
            glob = "src/**/*.js"
            command = "prettier --write"

            [[rules]]
            glob = "*.ts"
            command = { builtin = "conflict-markers" }
            non_versioned = true

            [[rules]]
            glob = "*.css"
            command = ["stylelint --fix", { builtin = "trailing-whitespace" }]
            skip = true
            "#,
        )
        .unwrap();

        assert_eq!(config.concurrency, 5);
        assert_eq!(
            config.ignore_extensions,
            HashSet::from([".dll".to_string(), ".map".to_string()])
        );
        assert_eq!(config.rules.len(), 3);
        assert_eq!(config.rules[0].describe_command(), "prettier --write");
        assert_eq!(config.rules[1].describe_command(), "builtin:conflict-markers");
        assert!(config.rules[1].non_versioned);
        assert_eq!(
            config.rules[2].describe_command(),
            "[stylelint --fix, builtin:trailing-whitespace]"
        );
        assert!(config.rules[2].skip);
    }

    #[test]
    fn test_camel_case_aliases() {
        let config = validate(
            r#"
            ignoreExtensions = [".map"]

            [[rules]]
            glob = "*.ts"
            command = "tslint"
            nonVersioned = true
            "#,
        )
        .unwrap();
        assert!(config.ignore_extensions.contains(".map"));
        assert!(config.rules[0].non_versioned);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_rejects_missing_or_empty_parts() {
        assert!(toml::from_str::<RawConfig>("concurrency = 2").is_err());

        let err = validate("rules = []").unwrap_err();
        assert!(err.to_string().contains("rules not defined"));

        let err = validate("[[rules]]\nglob = \"\"\ncommand = \"x\"").unwrap_err();
        assert!(format!("{err:#}").contains("rule.glob not defined"));

        let err = validate("[[rules]]\nglob = \"*.js\"\ncommand = \" \"").unwrap_err();
        assert!(format!("{err:#}").contains("rule.command not defined"));

        let err = validate("[[rules]]\nglob = \"*.js\"\ncommand = []").unwrap_err();
        assert!(format!("{err:#}").contains("rule.command not defined"));
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let err = validate("concurrency = 0\n[[rules]]\nglob = \"*.js\"\ncommand = \"x\"")
            .unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_rejects_unknown_builtin() {
        let err = validate("[[rules]]\nglob = \"*.js\"\ncommand = { builtin = \"nope\" }")
            .unwrap_err();
        assert!(format!("{err:#}").contains("Unknown builtin task 'nope'"));
    }

    #[test]
    fn test_rejects_package_manager_without_separator() {
        let err = validate("[[rules]]\nglob = \"*.js\"\ncommand = \"npm run lint\"").unwrap_err();
        assert!(format!("{err:#}").contains("must postfix with --"));

        assert!(validate("[[rules]]\nglob = \"*.js\"\ncommand = \"npm run lint --\"").is_ok());
    }

    #[test]
    fn test_rejects_invalid_glob() {
        let err = validate("[[rules]]\nglob = \"src/[\"\ncommand = \"x\"").unwrap_err();
        assert!(format!("{err:#}").contains("Invalid glob pattern"));
    }
}
