//! Realtime channel: the connection registry, the event frames, and the
//! WebSocket endpoint that bridges them.

mod events;
mod hub;
pub mod socket;

pub use events::*;
pub use hub::*;
