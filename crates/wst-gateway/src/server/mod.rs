//! WebSocket gateway server

mod handler;
mod listener;
mod origin;

pub use handler::router;
pub use listener::GatewayServer;
pub use origin::OriginPolicy;
