//! Per-session lifecycle
//!
//! A [`SessionCoordinator`] takes one upgraded channel through
//! `Establishing → Streaming → Closing → Closed`:
//!
//! 1. Builds the two tagged channel writers and hands them to the remote
//!    connector as the shell's stdout/stderr.
//! 2. On success, spawns the inbound pump with the shell's stdin sink.
//! 3. Waits for the first of: inbound pump exit, remote termination, or
//!    process shutdown.
//! 4. Aborts the pump, closes the remote session, closes the channel.
//!
//! A connect failure skips straight to closing the channel; the pump is
//! never started.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::WebSocket;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use wst_core::traits::{RemoteConnector, RemoteStreams};
use wst_core::{SessionState, TunnelError};
use wst_protocol::StreamTag;

use crate::channel::{split_websocket, ChannelReceiver, ChannelSender};
use crate::pump::{inbound_pump, ChannelWriter, PumpExit};
use crate::session::registry::{SessionGuard, SessionHandle};

/// How long teardown waits for the channel to flush and close
///
/// A client that stops reading can leave a send stuck on a full transport;
/// past this grace the channel is abandoned instead.
const CHANNEL_CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Why a session that reached (or was heading for) streaming ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The inbound pump stopped
    Inbound(PumpExit),
    /// The inbound pump task panicked
    PumpPanicked(String),
    /// The remote shell or its connection ended
    RemoteTerminated,
    /// The process is shutting down
    Shutdown,
}

/// Drives tunnel sessions against one remote connector
#[derive(Clone)]
pub struct SessionCoordinator {
    connector: Arc<dyn RemoteConnector>,
}

impl SessionCoordinator {
    /// Create a coordinator
    pub fn new(connector: Arc<dyn RemoteConnector>) -> Self {
        Self { connector }
    }

    /// Run a session over a freshly upgraded WebSocket
    ///
    /// Consumes the registry guard, so the session is deregistered when this
    /// returns.
    pub async fn serve_websocket(
        &self,
        guard: SessionGuard,
        socket: WebSocket,
        shutdown: CancellationToken,
    ) {
        let handle = Arc::clone(guard.handle());
        let span = tracing::info_span!("session", id = %handle.id, peer = %handle.peer);

        async {
            tracing::info!("WebSocket upgraded");
            let (sender, receiver) = split_websocket(socket);

            match self.run(&handle, sender, receiver, shutdown).await {
                Ok(reason) => {
                    tracing::info!(
                        elapsed = ?handle.started_at.elapsed(),
                        "Session closed: {:?}",
                        reason
                    );
                }
                Err(e) => {
                    tracing::warn!("Session aborted: {}", e);
                }
            }
        }
        .instrument(span)
        .await;

        drop(guard);
    }

    /// Run one session over an already split channel
    ///
    /// Returns an error only when the remote session could not be
    /// established; the channel has been closed in every case.
    pub async fn run(
        &self,
        handle: &SessionHandle,
        sender: ChannelSender,
        receiver: ChannelReceiver,
        shutdown: CancellationToken,
    ) -> Result<CloseReason, TunnelError> {
        handle.advance(SessionState::Establishing);

        let output = ChannelWriter::new(sender.clone(), StreamTag::RemoteOutput);
        let error = ChannelWriter::new(sender.clone(), StreamTag::RemoteError);

        let connected = tokio::select! {
            result = self.connector.connect(Box::new(output), Box::new(error)) => result,
            _ = shutdown.cancelled() => {
                handle.advance(SessionState::Closing);
                close_channel(&sender).await;
                return Ok(CloseReason::Shutdown);
            }
        };

        let RemoteStreams { input, mut session } = match connected {
            Ok(streams) => streams,
            Err(e) => {
                handle.advance(SessionState::Closing);
                close_channel(&sender).await;
                return Err(e.into());
            }
        };

        handle.advance(SessionState::Streaming);

        let mut inbound = tokio::spawn(inbound_pump(handle.id, receiver, input).in_current_span());

        let reason = tokio::select! {
            exit = &mut inbound => match exit {
                Ok(exit) => CloseReason::Inbound(exit),
                Err(e) => {
                    tracing::warn!("Inbound pump panicked: {}", e);
                    CloseReason::PumpPanicked(e.to_string())
                }
            },
            _ = session.terminated() => CloseReason::RemoteTerminated,
            _ = shutdown.cancelled() => CloseReason::Shutdown,
        };

        handle.advance(SessionState::Closing);
        tracing::debug!("Tearing down: {:?}", reason);

        inbound.abort();
        session.close().await;
        close_channel(&sender).await;

        Ok(reason)
    }
}

async fn close_channel(sender: &ChannelSender) {
    match tokio::time::timeout(CHANNEL_CLOSE_GRACE, sender.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!("Channel close failed: {}", e),
        Err(_) => tracing::warn!(
            "Channel did not close within {:?}, abandoning it",
            CHANNEL_CLOSE_GRACE
        ),
    }
}
