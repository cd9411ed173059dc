//! Remote shell traits

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::traits::ByteSink;

/// Handles returned by a successful connect
pub struct RemoteStreams {
    /// Sink feeding the remote shell's stdin
    pub input: Box<dyn ByteSink>,
    /// Lifetime handle of the remote shell
    pub session: Box<dyn RemoteSession>,
}

/// Establishes one interactive shell per call
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    /// Connect, start a shell, and route its stdout/stderr into the sinks
    ///
    /// A single attempt is made; failures are never retried.
    async fn connect(
        &self,
        output: Box<dyn ByteSink>,
        error: Box<dyn ByteSink>,
    ) -> Result<RemoteStreams, RemoteError>;
}

/// A running remote shell
#[async_trait]
pub trait RemoteSession: Send {
    /// Resolves once the remote shell or its connection has ended
    async fn terminated(&mut self);

    /// Release the shell and the underlying connection
    ///
    /// Calling this more than once is a no-op. Errors are logged, not returned.
    async fn close(&mut self);
}
