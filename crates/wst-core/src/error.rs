//! Core error types for the web shell tunnel

use std::path::PathBuf;

use thiserror::Error;
use wst_protocol::ProtocolError;

/// Top-level error type for a tunnel session or the process around it
#[derive(Error, Debug)]
pub enum TunnelError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The inbound HTTP connection could not be upgraded to a WebSocket
    #[error("Upgrade failed: {0}")]
    UpgradeFailed(String),

    /// The remote session could not be established
    #[error("Remote session error: {0}")]
    Remote(#[from] RemoteError),

    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// One direction of the tunnel stopped
    #[error("Stream terminated: {0}")]
    StreamTerminated(#[from] StreamError),
}

/// Failures while establishing the remote shell
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Network, timeout, host key, or authentication failure
    #[error("Dial failed: {0}")]
    DialFailed(String),

    /// Session channel or PTY request failed
    #[error("Session setup failed: {0}")]
    SessionSetupFailed(String),

    /// The shell request was refused
    #[error("Shell start failed: {0}")]
    ShellStartFailed(String),
}

/// Failure of a single read or write on one tunnel direction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The other end closed cleanly
    #[error("stream closed")]
    Closed,

    /// The underlying transport reported an error
    #[error("{0}")]
    Failed(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Missing mandatory field
    #[error("{0} is mandatory")]
    MissingField(String),
}
