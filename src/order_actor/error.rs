use thiserror::Error;

use crate::domain::OrderStatus;

/// Errors returned by the order lifecycle operations.
///
/// `Display` is the caller-facing message, except for `StoreFailure` whose
/// detail is only logged; see [`OrderError::public_message`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// Entity name, e.g. "Order" or "Shelter".
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid status value")]
    InvalidValue(String),
    #[error("Cannot change status from '{current}' to '{requested}'. Allowed next: {}", format_allowed(.allowed))]
    InvalidTransition {
        current: OrderStatus,
        requested: OrderStatus,
        allowed: Vec<OrderStatus>,
    },
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    MissingParameter(String),
    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl OrderError {
    pub fn not_available_for_claim() -> Self {
        OrderError::InvalidState("Order not available for claim".to_string())
    }

    pub fn invalid_transition(current: OrderStatus, requested: OrderStatus) -> Self {
        OrderError::InvalidTransition {
            current,
            requested,
            allowed: current.allowed_next().to_vec(),
        }
    }

    /// Message safe to show a client. Store failures collapse to `fallback`.
    pub fn public_message(&self, fallback: &str) -> String {
        match self {
            OrderError::StoreFailure(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

fn format_allowed(allowed: &[OrderStatus]) -> String {
    let quoted: Vec<String> = allowed.iter().map(|s| format!("\"{}\"", s)).collect();
    format!("[{}]", quoted.join(","))
}
