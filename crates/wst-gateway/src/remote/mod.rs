//! Remote session adapters

mod ssh;

pub use ssh::{ClientHandler, RemoteInput, SshConnector, SshSession};
