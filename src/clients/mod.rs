//! Typed clients in front of the resource actors. These are the store API the
//! lifecycle service talks to.

#[macro_use]
mod macros;
mod order_client;
mod shelter_client;
mod reroute_client;

pub use order_client::OrderClient;
pub use shelter_client::ShelterClient;
pub use reroute_client::{RerouteClient, ReroutePage};

use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Store-level failures, as seen by callers of the typed clients.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    /// A guarded update lost to a concurrent writer.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<FrameworkError> for StoreError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => StoreError::NotFound(id),
            FrameworkError::PreconditionFailed(msg) => StoreError::Conflict(msg),
            FrameworkError::Rejected(msg) => StoreError::Rejected(msg),
            other @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                StoreError::Unavailable(other.to_string())
            }
        }
    }
}
