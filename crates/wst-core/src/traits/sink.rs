//! Byte sink capability

use async_trait::async_trait;

use crate::error::StreamError;

/// Anything that accepts a stream of bytes
///
/// Implemented by the tagged channel writers (remote stdout and stderr
/// heading to the browser) and by the remote shell's stdin.
#[async_trait]
pub trait ByteSink: Send {
    /// Write all of `data`, waiting for the destination to accept it
    async fn write(&mut self, data: &[u8]) -> Result<(), StreamError>;
}

#[async_trait]
impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    async fn write(&mut self, data: &[u8]) -> Result<(), StreamError> {
        (**self).write(data).await
    }
}
