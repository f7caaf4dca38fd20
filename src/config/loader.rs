use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::level::LogLevel;

use super::types::Config;

impl Config {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        debug!(path = %path.display(), "loading configuration");

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        Self::from_yaml(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(yaml).context("failed to parse YAML configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.telemetry
            .log_level
            .parse::<LogLevel>()
            .with_context(|| format!("invalid telemetry.log_level: {}", self.telemetry.log_level))?;

        if self.admin.ready_timeout.is_zero() {
            anyhow::bail!("admin.ready_timeout must be greater than zero");
        }

        Ok(())
    }
}
