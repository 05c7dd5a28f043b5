use super::Config;
use crate::errors::ConfigError;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load_configuration(config_dir.as_ref()).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &Path) -> Result<Config> {
        let main_config_path = config_dir.join("main.toml");
        let content = fs::read_to_string(&main_config_path)
            .await
            .map_err(|e| ConfigError::LoadFailed {
                path: main_config_path.display().to_string(),
                reason: e.to_string(),
            })?;

        let config = Self::parse(&content)?;

        info!(
            "Loaded config for node '{}' (endpoint {}, poll every {}s, sync threshold {} blocks, registry {})",
            config.node_name,
            config.endpoint,
            config.poll_interval_seconds,
            config.sync_threshold,
            if config.consul.is_some() { "enabled" } else { "disabled" }
        );

        Ok(config)
    }

    /// Parse and validate a `main.toml` document
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}
