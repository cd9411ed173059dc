//! Stream tags identifying the logical byte stream of a message

use std::fmt;

/// Logical stream a channel message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StreamTag {
    /// Keystrokes from the browser, destined for the shell's stdin
    ClientInput = 0,
    /// Bytes produced on the shell's stdout
    RemoteOutput = 1,
    /// Bytes produced on the shell's stderr
    RemoteError = 2,
}

impl StreamTag {
    /// Convert from the wire byte, returning None for unknown tags
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::ClientInput),
            1 => Some(Self::RemoteOutput),
            2 => Some(Self::RemoteError),
            _ => None,
        }
    }

    /// Wire representation
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for StreamTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClientInput => "client-input",
            Self::RemoteOutput => "remote-output",
            Self::RemoteError => "remote-error",
        };
        f.write_str(name)
    }
}

impl From<StreamTag> for u8 {
    fn from(tag: StreamTag) -> Self {
        tag.as_u8()
    }
}
