//! Tunnel session lifecycle

mod coordinator;
mod registry;

pub use coordinator::{CloseReason, SessionCoordinator};
pub use registry::{SessionGuard, SessionHandle, SessionRegistry};
