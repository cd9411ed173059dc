//! Core domain types

use std::fmt;

/// Process-unique identifier for one client's tunnel session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl SessionId {
    /// Create a new session ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

impl From<u64> for SessionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Lifecycle of a tunnel session
///
/// States only move forward, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SessionState {
    /// Transport accepted, WebSocket upgrade in progress
    Connecting = 0,
    /// Channel upgraded, remote shell being dialed
    Establishing = 1,
    /// Shell running, pumps forwarding bytes
    Streaming = 2,
    /// Tearing down the remote session and the channel
    Closing = 3,
    /// Terminal
    Closed = 4,
}

impl SessionState {
    /// Convert from the stored discriminant
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Connecting),
            1 => Some(Self::Establishing),
            2 => Some(Self::Streaming),
            3 => Some(Self::Closing),
            4 => Some(Self::Closed),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_advance_to(self, next: SessionState) -> bool {
        next > self
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Establishing => "establishing",
            Self::Streaming => "streaming",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}
