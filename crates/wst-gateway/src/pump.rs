//! Stream pumps between raw byte endpoints and the tagged channel
//!
//! Inbound, a loop reads channel messages and feeds `ClientInput` payloads to
//! the remote stdin. Outbound is reactive: the remote adapter writes stdout
//! and stderr into a [`ChannelWriter`], which tags each write and sends it as
//! one message.

use async_trait::async_trait;

use wst_core::traits::ByteSink;
use wst_core::{SessionId, StreamError};
use wst_protocol::{decode, encode, StreamTag};

use crate::channel::{ChannelReceiver, ChannelSender};

/// Outbound sink that tags every write with a fixed stream tag
pub struct ChannelWriter {
    sender: ChannelSender,
    tag: StreamTag,
}

impl ChannelWriter {
    /// Create a writer for one outbound stream
    pub fn new(sender: ChannelSender, tag: StreamTag) -> Self {
        Self { sender, tag }
    }
}

#[async_trait]
impl ByteSink for ChannelWriter {
    async fn write(&mut self, data: &[u8]) -> Result<(), StreamError> {
        self.sender.send(encode(self.tag, data)).await
    }
}

/// Why the inbound pump stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// The client closed the channel
    ChannelClosed,
    /// Reading from the channel failed
    ChannelFailed(StreamError),
    /// The remote stdin refused a write
    InputFailed(StreamError),
}

/// Forward `ClientInput` messages from the channel into the remote stdin
///
/// Runs until the channel closes or fails, or a write to `input` fails.
/// Empty messages and messages with any other tag are dropped.
pub async fn inbound_pump<S>(
    session_id: SessionId,
    mut receiver: ChannelReceiver,
    mut input: S,
) -> PumpExit
where
    S: ByteSink,
{
    loop {
        let message = match receiver.recv().await {
            Ok(message) => message,
            Err(StreamError::Closed) => {
                tracing::debug!(session = %session_id, "Channel closed by client");
                return PumpExit::ChannelClosed;
            }
            Err(e) => {
                tracing::info!(session = %session_id, error = %e, "Channel read failed");
                return PumpExit::ChannelFailed(e);
            }
        };

        let frame = match decode(message) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::trace!(session = %session_id, "Dropping message: {}", e);
                continue;
            }
        };

        if frame.stream_tag() != Some(StreamTag::ClientInput) {
            tracing::trace!(
                session = %session_id,
                tag = frame.raw_tag(),
                "Dropping message with non-input tag"
            );
            continue;
        }

        if let Err(e) = input.write(frame.payload()).await {
            tracing::info!(session = %session_id, error = %e, "Remote input write failed");
            return PumpExit::InputFailed(e);
        }
    }
}
