//! Configuration management for A1 Shell

mod panel;
pub mod serde_utils;

pub use panel::{PanelConfig, DEFAULT_NOTICE_TTL, DEFAULT_REMEDIATION_HINT};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Layout of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub panel: PanelConfig,
}

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("a1-shell")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load the panel configuration, falling back to defaults when the file is absent
pub fn load_panel_config(path: Option<&Path>) -> Result<PanelConfig, ConfigError> {
    let default_path = default_config_path();
    let path = path.unwrap_or(default_path.as_path());

    match load_config::<ConfigFile>(path) {
        Ok(file) => {
            tracing::debug!("Loaded panel config from {:?}", path);
            Ok(file.panel)
        }
        Err(ConfigError::NotFound(_)) => {
            tracing::debug!("Config file {:?} not found, using defaults", path);
            Ok(PanelConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}
