//! wst-gateway: WebSocket gateway to a remote SSH shell
//!
//! Each browser connection is upgraded to a WebSocket, an SSH shell is opened
//! for it, and the shell's stdin/stdout/stderr are multiplexed over the
//! socket with a one-byte stream tag per message. The WebSocket and the SSH
//! session live and die together.

pub mod channel;
pub mod pump;
pub mod remote;
pub mod server;
pub mod session;
pub mod state;

pub use session::{SessionCoordinator, SessionRegistry};
pub use state::GatewayState;
