//! wst-core: Core abstractions and configuration for the web shell tunnel
//!
//! This crate provides the configuration structures, error taxonomy, shared
//! types, and the byte-sink / remote-session traits that the gateway wires
//! together.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{ConfigError, RemoteError, StreamError, TunnelError};
pub use types::{SessionId, SessionState};
