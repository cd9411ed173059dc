//! Configuration management for the web shell tunnel

mod gateway;
mod remote;
pub mod serde_utils;

pub use gateway::GatewayConfig;
pub use remote::{HostKeyPolicy, PtyConfig, RemoteConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Complete process configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    /// WebSocket listener settings
    pub gateway: GatewayConfig,
    /// SSH target settings
    pub remote: RemoteConfig,
}

impl TunnelConfig {
    /// Check that every mandatory parameter is present
    ///
    /// Reports the first missing field, in the order port, host, username,
    /// password.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.port == 0 {
            return Err(ConfigError::MissingField("port".to_string()));
        }
        if self.remote.host.trim().is_empty() {
            return Err(ConfigError::MissingField("host".to_string()));
        }
        if self.remote.username.is_empty() {
            return Err(ConfigError::MissingField("username".to_string()));
        }
        if self.remote.password.is_empty() {
            return Err(ConfigError::MissingField("password".to_string()));
        }
        if !self.gateway.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "path must start with '/': {}",
                self.gateway.path
            )));
        }
        if self.remote.port == 0 {
            return Err(ConfigError::Invalid("remote port must be non-zero".to_string()));
        }
        if self.gateway.max_sessions == Some(0) {
            return Err(ConfigError::Invalid(
                "max_sessions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("web-shell-tunnel")
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
    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}
