use crate::error::SettingsError;
use connectors::api::settings::ApiSettings;
use pipeline::PipelineSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub mod pipeline;

/// Effective configuration of one run: the remote source and the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub pipeline: PipelineSettings,
}

impl AppConfig {
    /// Reads a JSON configuration file. Absent members take their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.api.timeout_secs == 0 {
            return Err(SettingsError::InvalidApi(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.api.max_attempts == 0 {
            return Err(SettingsError::InvalidApi(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        self.pipeline.validate()
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
