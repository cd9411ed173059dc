//! SSH remote session adapter
//!
//! Dials the configured host, authenticates with a password, requests a PTY
//! and starts a shell. After that a driver task owns the SSH channel: it
//! writes remote stdout/stderr into the supplied sinks as data arrives and
//! feeds queued stdin bytes to the channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use russh::client::{self, Handle, Msg};
use russh::{Channel, ChannelMsg, Disconnect, Pty};
use russh_keys::key::PublicKey;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use wst_core::config::{HostKeyPolicy, RemoteConfig};
use wst_core::traits::{ByteSink, RemoteConnector, RemoteSession, RemoteStreams};
use wst_core::{RemoteError, StreamError};

/// Stdin chunks queued between the inbound pump and the driver task.
///
/// The queue is bounded so a slow SSH window pushes back on the browser
/// instead of buffering without limit.
const INPUT_QUEUE_CAPACITY: usize = 64;

/// How long `close` waits for the driver task before aborting it
const DRIVER_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// SSH extended data stream number for stderr
const SSH_EXTENDED_DATA_STDERR: u32 = 1;

/// Opens one interactive SSH shell per tunnel session
pub struct SshConnector {
    config: Arc<RemoteConfig>,
}

impl SshConnector {
    /// Create a connector for the configured remote host
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Connect and authenticate
    async fn dial(&self) -> Result<Handle<ClientHandler>, RemoteError> {
        let ssh_config = Arc::new(client::Config::default());
        let handler = ClientHandler::new(self.config.host_key.clone());
        let address = self.config.address();

        tracing::debug!("Connecting to {}", address);
        let mut handle = tokio::time::timeout(
            self.config.connect_timeout,
            client::connect(ssh_config, address.as_str(), handler),
        )
        .await
        .map_err(|_| {
            RemoteError::DialFailed(format!(
                "connection to {} timed out after {:?}",
                address, self.config.connect_timeout
            ))
        })?
        .map_err(|e| RemoteError::DialFailed(format!("failed to connect to {}: {}", address, e)))?;

        tracing::debug!("Authenticating as user '{}'", self.config.username);
        let authenticated = handle
            .authenticate_password(self.config.username.clone(), self.config.password.clone())
            .await
            .map_err(|e| RemoteError::DialFailed(format!("authentication error: {}", e)))?;

        if !authenticated {
            disconnect(&handle, "authentication rejected").await;
            return Err(RemoteError::DialFailed(format!(
                "authentication rejected for user '{}'",
                self.config.username
            )));
        }

        Ok(handle)
    }

    /// Open a session channel, request the PTY and start the shell
    ///
    /// Output that arrives while waiting for the replies is returned so the
    /// driver can deliver it first.
    async fn start_shell(
        &self,
        handle: &Handle<ClientHandler>,
    ) -> Result<(Channel<Msg>, Vec<ChannelMsg>), RemoteError> {
        let mut channel = handle
            .channel_open_session()
            .await
            .map_err(|e| RemoteError::SessionSetupFailed(format!("failed to open session channel: {}", e)))?;

        let pty = &self.config.pty;
        let modes = [
            (Pty::TTY_OP_ISPEED, pty.input_speed),
            (Pty::TTY_OP_OSPEED, pty.output_speed),
        ];
        channel
            .request_pty(true, &pty.term, pty.cols, pty.rows, 0, 0, &modes)
            .await
            .map_err(|e| RemoteError::SessionSetupFailed(format!("pty request failed: {}", e)))?;

        let mut early = Vec::new();
        self.await_reply(&mut channel, &mut early)
            .await
            .map_err(|reason| RemoteError::SessionSetupFailed(format!("pty request {}", reason)))?;

        channel
            .request_shell(true)
            .await
            .map_err(|e| RemoteError::ShellStartFailed(format!("shell request failed: {}", e)))?;
        self.await_reply(&mut channel, &mut early)
            .await
            .map_err(|reason| RemoteError::ShellStartFailed(format!("shell request {}", reason)))?;

        Ok((channel, early))
    }

    /// Wait for the success/failure reply to the last channel request
    async fn await_reply(
        &self,
        channel: &mut Channel<Msg>,
        early: &mut Vec<ChannelMsg>,
    ) -> Result<(), String> {
        let wait = async {
            loop {
                match channel.wait().await {
                    Some(ChannelMsg::Success) => return Ok(()),
                    Some(ChannelMsg::Failure) => return Err("refused by server".to_string()),
                    Some(ChannelMsg::Close) | None => return Err("aborted: channel closed".to_string()),
                    Some(msg @ ChannelMsg::Data { .. }) | Some(msg @ ChannelMsg::ExtendedData { .. }) => {
                        early.push(msg);
                    }
                    Some(other) => {
                        tracing::trace!("Ignoring {:?} while awaiting reply", other);
                    }
                }
            }
        };

        tokio::time::timeout(self.config.connect_timeout, wait)
            .await
            .map_err(|_| "timed out waiting for reply".to_string())?
    }
}

#[async_trait]
impl RemoteConnector for SshConnector {
    async fn connect(
        &self,
        output: Box<dyn ByteSink>,
        error: Box<dyn ByteSink>,
    ) -> Result<RemoteStreams, RemoteError> {
        let handle = self.dial().await?;

        let (channel, early) = match self.start_shell(&handle).await {
            Ok(started) => started,
            Err(e) => {
                disconnect(&handle, "session setup failed").await;
                return Err(e);
            }
        };

        tracing::info!(
            "Shell started on {} as '{}'",
            self.config.address(),
            self.config.username
        );

        let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        let shutdown = CancellationToken::new();
        let terminated = CancellationToken::new();

        let driver = ChannelDriver {
            channel,
            input_rx,
            output: Some(output),
            error: Some(error),
        };
        let task = tokio::spawn(
            driver
                .run(early, shutdown.clone(), terminated.clone())
                .in_current_span(),
        );

        Ok(RemoteStreams {
            input: Box::new(RemoteInput { tx: input_tx }),
            session: Box::new(SshSession {
                handle: Some(handle),
                driver: Some(task),
                shutdown,
                terminated,
            }),
        })
    }
}

/// Stdin sink of the remote shell
pub struct RemoteInput {
    tx: mpsc::Sender<Bytes>,
}

#[async_trait]
impl ByteSink for RemoteInput {
    async fn write(&mut self, data: &[u8]) -> Result<(), StreamError> {
        self.tx
            .send(Bytes::copy_from_slice(data))
            .await
            .map_err(|_| StreamError::Closed)
    }
}

/// Owns the SSH channel once the shell is running
struct ChannelDriver {
    channel: Channel<Msg>,
    input_rx: mpsc::Receiver<Bytes>,
    output: Option<Box<dyn ByteSink>>,
    error: Option<Box<dyn ByteSink>>,
}

impl ChannelDriver {
    async fn run(
        mut self,
        early: Vec<ChannelMsg>,
        shutdown: CancellationToken,
        terminated: CancellationToken,
    ) {
        let _terminated = terminated.drop_guard();

        for msg in early {
            if !self.dispatch(msg).await {
                return;
            }
        }

        let mut input_open = true;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("Channel driver shutting down");
                    break;
                }

                msg = self.channel.wait() => {
                    let Some(msg) = msg else {
                        tracing::debug!("SSH channel ended");
                        break;
                    };
                    if !self.dispatch(msg).await {
                        break;
                    }
                }

                data = self.input_rx.recv(), if input_open => {
                    match data {
                        Some(data) => {
                            if let Err(e) = self.channel.data(&data[..]).await {
                                tracing::warn!("Failed to write to remote stdin: {}", e);
                                break;
                            }
                        }
                        None => {
                            input_open = false;
                            if let Err(e) = self.channel.eof().await {
                                tracing::debug!("Failed to send EOF: {}", e);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Deliver one channel message; returns false once the channel is done
    async fn dispatch(&mut self, msg: ChannelMsg) -> bool {
        match msg {
            ChannelMsg::Data { data } => {
                forward(&mut self.output, &data[..], "stdout").await;
            }
            ChannelMsg::ExtendedData { data, ext } if ext == SSH_EXTENDED_DATA_STDERR => {
                forward(&mut self.error, &data[..], "stderr").await;
            }
            ChannelMsg::ExtendedData { ext, .. } => {
                tracing::trace!("Ignoring extended data stream {}", ext);
            }
            ChannelMsg::ExitStatus { exit_status } => {
                tracing::info!("Remote shell exited with status {}", exit_status);
            }
            ChannelMsg::ExitSignal { signal_name, .. } => {
                tracing::info!("Remote shell killed by signal {:?}", signal_name);
            }
            ChannelMsg::Eof => {
                tracing::debug!("Remote shell closed its output");
            }
            ChannelMsg::Close => {
                tracing::debug!("Remote closed the channel");
                return false;
            }
            _ => {}
        }
        true
    }
}

/// Write to an outbound sink, disabling it after the first failure
async fn forward(sink: &mut Option<Box<dyn ByteSink>>, data: &[u8], stream: &str) {
    let Some(writer) = sink.as_mut() else {
        return;
    };
    if let Err(e) = writer.write(data).await {
        tracing::debug!("Stopped forwarding remote {}: {}", stream, e);
        *sink = None;
    }
}

async fn disconnect(handle: &Handle<ClientHandler>, description: &str) {
    if let Err(e) = handle
        .disconnect(Disconnect::ByApplication, description, "en")
        .await
    {
        tracing::debug!("SSH disconnect failed: {}", e);
    }
}

/// A running SSH shell
pub struct SshSession {
    handle: Option<Handle<ClientHandler>>,
    driver: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
    terminated: CancellationToken,
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn terminated(&mut self) {
        self.terminated.cancelled().await;
    }

    async fn close(&mut self) {
        self.shutdown.cancel();

        if let Some(mut driver) = self.driver.take() {
            match tokio::time::timeout(DRIVER_SHUTDOWN_GRACE, &mut driver).await {
                Ok(Err(e)) if !e.is_cancelled() => {
                    tracing::warn!("Channel driver ended abnormally: {}", e);
                }
                Ok(_) => {}
                Err(_) => {
                    tracing::debug!("Channel driver did not stop in time, aborting");
                    driver.abort();
                }
            }
        }

        if let Some(handle) = self.handle.take() {
            disconnect(&handle, "tunnel closed").await;
        }
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

/// russh client handler for the tunnel's SSH connection
pub struct ClientHandler {
    host_key: HostKeyPolicy,
}

impl ClientHandler {
    fn new(host_key: HostKeyPolicy) -> Self {
        Self { host_key }
    }
}

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    /// Verify the server's host key against the configured policy
    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint();

        if self.host_key.accepts(&fingerprint) {
            tracing::debug!("Server host key accepted: SHA256:{}", fingerprint);
            Ok(true)
        } else {
            tracing::warn!("Server host key rejected: SHA256:{}", fingerprint);
            Ok(false)
        }
    }

    async fn auth_banner(
        &mut self,
        banner: &str,
        _session: &mut client::Session,
    ) -> Result<(), Self::Error> {
        tracing::info!("SSH banner: {}", banner.trim_end());
        Ok(())
    }
}
