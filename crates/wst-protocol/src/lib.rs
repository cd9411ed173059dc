//! wst-protocol: Wire framing for the web shell tunnel
//!
//! Every WebSocket message exchanged with the browser carries a single
//! stream tag byte followed by the raw payload. This crate owns that framing
//! and nothing else.

pub mod error;
pub mod frame;
pub mod tag;

pub use error::ProtocolError;
pub use frame::{decode, encode, Frame, TAG_SIZE};
pub use tag::StreamTag;
