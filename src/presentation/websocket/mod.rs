//! Real-time Relay
//!
//! WebSocket endpoint delivering direct messages and read receipts.

pub mod handler;
pub mod messages;
pub mod relay;
pub mod session;

pub use handler::ws_handler;
pub use messages::{ClientEvent, Envelope, ServerEvent};
pub use relay::Relay;
pub use session::SessionState;
