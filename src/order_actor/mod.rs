//! Order entity wiring for the resource actor, and the lifecycle error type.

pub mod entity;
pub mod error;

pub use error::*;
