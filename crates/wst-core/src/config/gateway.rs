//! Gateway (WebSocket listener) configuration

use serde::{Deserialize, Serialize};

/// Configuration for the WebSocket listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Interface to bind
    pub bind_address: String,

    /// Port to listen on; 0 means not configured
    pub port: u16,

    /// HTTP path that accepts the WebSocket upgrade
    pub path: String,

    /// Subprotocol token offered during the upgrade
    pub subprotocol: String,

    /// Browser origins allowed to open a tunnel; empty accepts any origin
    pub allowed_origins: Vec<String>,

    /// Maximum number of concurrent tunnel sessions
    pub max_sessions: Option<usize>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 0,
            path: "/ws".to_string(),
            subprotocol: "binary".to_string(),
            allowed_origins: Vec::new(),
            max_sessions: None,
        }
    }
}

impl GatewayConfig {
    /// Socket address to bind (`host:port`)
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
