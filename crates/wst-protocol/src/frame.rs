//! Message framing
//!
//! A channel message has a one-byte header:
//! - tag: 1 byte (0 = client input, 1 = remote output, 2 = remote error)
//! - payload: remaining bytes, possibly empty
//!
//! The WebSocket layer already delimits messages, so there is no length field.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;
use crate::tag::StreamTag;

/// Size of the frame header in bytes
pub const TAG_SIZE: usize = 1;

/// A decoded channel message
///
/// The tag is kept as the raw wire byte. Unknown values decode successfully
/// so that consumers decide what to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    tag: u8,
    payload: Bytes,
}

impl Frame {
    /// Create a frame for a known stream
    pub fn new(tag: StreamTag, payload: impl Into<Bytes>) -> Self {
        Self {
            tag: tag.as_u8(),
            payload: payload.into(),
        }
    }

    /// The tag byte exactly as received
    pub fn raw_tag(&self) -> u8 {
        self.tag
    }

    /// The tag, if it is one this protocol knows
    pub fn stream_tag(&self) -> Option<StreamTag> {
        StreamTag::from_u8(self.tag)
    }

    /// Payload bytes
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Consume the frame, returning the payload
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Encode this frame back into a message
    pub fn to_message(&self) -> Bytes {
        encode_raw(self.tag, &self.payload)
    }
}

/// Encode a payload as a single tagged message
pub fn encode(tag: StreamTag, payload: &[u8]) -> Bytes {
    encode_raw(tag.as_u8(), payload)
}

fn encode_raw(tag: u8, payload: &[u8]) -> Bytes {
    let mut dst = BytesMut::with_capacity(TAG_SIZE + payload.len());
    dst.put_u8(tag);
    dst.extend_from_slice(payload);
    dst.freeze()
}

/// Decode a message into its tag and payload
///
/// Fails only when the message is empty. The payload shares the message's
/// allocation.
pub fn decode(message: Bytes) -> Result<Frame, ProtocolError> {
    if message.is_empty() {
        return Err(ProtocolError::MalformedFrame);
    }

    let tag = message[0];
    let payload = message.slice(TAG_SIZE..);

    Ok(Frame { tag, payload })
}
