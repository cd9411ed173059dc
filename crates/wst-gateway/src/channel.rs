//! Transport channel: the browser-facing WebSocket split into halves
//!
//! The send half is shared by the two outbound directions (remote stdout and
//! stderr), so every send goes through one async mutex; WebSocket sinks do
//! not tolerate concurrent writers. The receive half is owned by the inbound
//! pump alone.

use std::pin::Pin;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures::{future, Sink, SinkExt, Stream, StreamExt};
use tokio::sync::Mutex;

use wst_core::StreamError;

type BoxSink = Pin<Box<dyn Sink<Bytes, Error = StreamError> + Send>>;
type BoxStream = Pin<Box<dyn Stream<Item = Result<Incoming, StreamError>> + Send>>;

/// What arrived on the receive half
enum Incoming {
    /// A binary message, forwarded to the caller
    Binary(Bytes),
    /// Text, ping, or pong; not part of the tunnel protocol
    Ignored,
    /// The peer sent a close frame
    Close,
}

/// Shared, serialized send half of the channel
#[derive(Clone)]
pub struct ChannelSender {
    sink: Arc<Mutex<BoxSink>>,
}

impl ChannelSender {
    /// Wrap any sink of binary messages
    pub fn new<S>(sink: S) -> Self
    where
        S: Sink<Bytes, Error = StreamError> + Send + 'static,
    {
        Self {
            sink: Arc::new(Mutex::new(Box::pin(sink))),
        }
    }

    /// Send one binary message, waiting for the transport to accept it
    pub async fn send(&self, message: Bytes) -> Result<(), StreamError> {
        let mut sink = self.sink.lock().await;
        sink.send(message).await
    }

    /// Close the channel
    pub async fn close(&self) -> Result<(), StreamError> {
        let mut sink = self.sink.lock().await;
        sink.close().await
    }
}

/// Receive half of the channel
pub struct ChannelReceiver {
    stream: BoxStream,
}

impl ChannelReceiver {
    /// Wrap any stream of binary messages
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, StreamError>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream.map(|item| item.map(Incoming::Binary))),
        }
    }

    /// Wait for the next binary message
    ///
    /// Returns `Err(StreamError::Closed)` once the peer has closed the channel
    /// or the stream has ended.
    pub async fn recv(&mut self) -> Result<Bytes, StreamError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Incoming::Binary(data))) => return Ok(data),
                Some(Ok(Incoming::Ignored)) => continue,
                Some(Ok(Incoming::Close)) | None => return Err(StreamError::Closed),
                Some(Err(e)) => return Err(e),
            }
        }
    }
}

/// Split an upgraded WebSocket into channel halves
pub fn split_websocket(socket: WebSocket) -> (ChannelSender, ChannelReceiver) {
    let (sink, stream) = socket.split();

    let sink = sink
        .sink_map_err(|e| StreamError::Failed(e.to_string()))
        .with(|message: Bytes| future::ready(Ok::<_, StreamError>(Message::Binary(message.to_vec()))));

    let stream = stream.map(|message| match message {
        Ok(Message::Binary(data)) => Ok(Incoming::Binary(Bytes::from(data))),
        Ok(Message::Close(_)) => Ok(Incoming::Close),
        Ok(Message::Text(_)) => {
            tracing::trace!("Ignoring text message on binary channel");
            Ok(Incoming::Ignored)
        }
        Ok(_) => Ok(Incoming::Ignored),
        Err(e) => Err(StreamError::Failed(e.to_string())),
    });

    let sender = ChannelSender::new(sink);
    let receiver = ChannelReceiver {
        stream: Box::pin(stream),
    };
    (sender, receiver)
}
