use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OrderStatus;

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    /// Unit price.
    pub price: f64,
}

/// Snapshot of the shelter an order was donated to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelterAssignment {
    pub shelter_id: String,
    pub shelter_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    /// Current owner. Moves to the claimer when a redistributed order is claimed.
    pub user_id: String,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    /// Owner before the first transfer; written once.
    pub original_user_id: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub amount: f64,
    pub shelter: Option<ShelterAssignment>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Whether `user_id` may act on this order as its customer.
    pub fn is_held_by(&self, user_id: &str) -> bool {
        self.user_id == user_id || self.claimed_by.as_deref() == Some(user_id)
    }
}

/// Payload for placing a new order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub amount: f64,
}

/// A mutation of an order, applied atomically by the order store.
#[derive(Debug, Clone)]
pub enum OrderChange {
    /// Release the order for redistribution.
    Cancel,
    /// Transfer ownership to `user_id` and return the order to fulfilment.
    Claim { user_id: String, at: DateTime<Utc> },
    /// Plain status change.
    Status(OrderStatus),
    /// Hand the order to a shelter.
    Donate(ShelterAssignment),
}

/// Update payload. When `expected_status` is set the store applies the
/// change only if the stored order is still in that status.
#[derive(Debug, Clone)]
pub struct OrderPatch {
    pub expected_status: Option<OrderStatus>,
    pub change: OrderChange,
}

impl OrderPatch {
    pub fn guarded(expected_status: OrderStatus, change: OrderChange) -> Self {
        Self {
            expected_status: Some(expected_status),
            change,
        }
    }
}
