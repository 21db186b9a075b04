//! Order lifecycle service: the operations that move an order through its
//! states, plus the read-side queries the HTTP surface needs.

mod service;

pub use service::*;

use crate::clients::StoreError;
use crate::order_actor::OrderError;

impl From<StoreError> for OrderError {
    /// Fallback mapping. Operations that expect a conflict handle
    /// `Conflict`/`Rejected` themselves before reaching this.
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => OrderError::NotFound("Order"),
            StoreError::Conflict(_) | StoreError::Rejected(_) => {
                OrderError::InvalidState("Order status changed concurrently".to_string())
            }
            StoreError::Unavailable(msg) => OrderError::StoreFailure(msg),
        }
    }
}
