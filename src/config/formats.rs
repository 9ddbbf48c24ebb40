use super::core::LintSvnConfig;
use anyhow::Result;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
    Yaml,
}

impl LintSvnConfig {
    /// Export the merged configuration in the given format
    pub fn export_config(&self, format: ConfigFormat) -> Result<String> {
        let config = self.raw()?;

        let output = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
            ConfigFormat::Toml => toml::to_string_pretty(&config)?,
            ConfigFormat::Yaml => serde_yml::to_string(&config)?,
        };

        Ok(output)
    }
}
