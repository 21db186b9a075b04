use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Order, OrderItem};

pub const REDISTRIBUTION_MESSAGE: &str =
    "An order has been cancelled and is available for redistribution";

/// "Offer this cancelled order to users one at a time." Also the payload of
/// the `orderCancelled` event each recipient receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastJob {
    pub order_id: String,
    pub items: Vec<OrderItem>,
    /// The user who cancelled; never offered their own order.
    pub excluded_user_id: String,
    pub message: String,
    /// Claims made at or after this instant make the job stale.
    pub cancelled_at: DateTime<Utc>,
}

impl BroadcastJob {
    pub fn for_cancelled(order: &Order, cancelled_by: &str, cancelled_at: DateTime<Utc>) -> Self {
        Self {
            order_id: order.id.clone(),
            items: order.items.clone(),
            excluded_user_id: cancelled_by.to_string(),
            message: REDISTRIBUTION_MESSAGE.to_string(),
            cancelled_at,
        }
    }
}

/// How a job left the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Every eligible connection was offered the order and nobody claimed it.
    Exhausted,
    /// The order was claimed; remaining recipients were skipped.
    Claimed,
}
