//! Core trait definitions

mod remote;
mod sink;

pub use remote::{RemoteConnector, RemoteSession, RemoteStreams};
pub use sink::ByteSink;
