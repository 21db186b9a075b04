//! System orchestration, startup, and shutdown logic.

pub mod config;
pub mod system;
pub mod tracing;

pub use config::*;
pub use system::*;
pub use self::tracing::setup_tracing;
