//! Protocol error types

use thiserror::Error;

/// Errors that can occur while decoding a channel message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The message carried no tag byte at all
    #[error("Malformed frame: message is empty")]
    MalformedFrame,
}
