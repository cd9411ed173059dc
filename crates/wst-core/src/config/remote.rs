//! Remote SSH target configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;

/// Configuration for the SSH connection opened per tunnel session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// SSH server host name or IP address
    pub host: String,

    /// SSH server port
    pub port: u16,

    /// Username for password authentication
    pub username: String,

    /// Password for password authentication
    pub password: String,

    /// Bound on dialing and key exchange
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Pseudo-terminal requested for the shell
    pub pty: PtyConfig,

    /// How the server's host key is verified
    pub host_key: HostKeyPolicy,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            username: String::new(),
            password: String::new(),
            connect_timeout: Duration::from_secs(10),
            pty: PtyConfig::default(),
            host_key: HostKeyPolicy::default(),
        }
    }
}

impl RemoteConfig {
    /// Address to dial (`host:port`)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Pseudo-terminal parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PtyConfig {
    /// Value of TERM on the remote side
    pub term: String,
    /// Width in characters
    pub cols: u32,
    /// Height in characters
    pub rows: u32,
    /// TTY_OP_ISPEED terminal mode
    pub input_speed: u32,
    /// TTY_OP_OSPEED terminal mode
    pub output_speed: u32,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            term: "xterm".to_string(),
            // 80 columns by 40 rows; some SSH APIs take (height, width)
            // and would swap these.
            cols: 80,
            rows: 40,
            input_speed: 14400,
            output_speed: 14400,
        }
    }
}

/// Host key verification policy
///
/// `AcceptAny` trusts whatever key the server presents and offers no
/// protection against a man in the middle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Accept any host key
    #[default]
    AcceptAny,
    /// Accept only a key with this SHA-256 fingerprint (base64, optional `SHA256:` prefix)
    Fingerprint {
        /// Expected fingerprint
        fingerprint: String,
    },
}

impl HostKeyPolicy {
    /// Decide whether a presented key fingerprint is trusted
    pub fn accepts(&self, presented: &str) -> bool {
        match self {
            Self::AcceptAny => true,
            Self::Fingerprint { fingerprint } => {
                strip_sha256_prefix(fingerprint) == strip_sha256_prefix(presented)
            }
        }
    }

    /// Whether this policy skips verification
    pub fn is_insecure(&self) -> bool {
        matches!(self, Self::AcceptAny)
    }
}

fn strip_sha256_prefix(fingerprint: &str) -> &str {
    let trimmed = fingerprint.trim();
    trimmed.strip_prefix("SHA256:").unwrap_or(trimmed)
}
