use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of an order. The serialized form is the exact literal
/// clients send and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Food Processing")]
    Processing,
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
    #[serde(rename = "Redistribute")]
    Redistribute,
    #[serde(rename = "Cancelled")]
    Cancelled,
    #[serde(rename = "Donated")]
    Donated,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Processing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Redistribute,
        OrderStatus::Cancelled,
        OrderStatus::Donated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Food Processing",
            OrderStatus::OutForDelivery => "Out for delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Redistribute => "Redistribute",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Donated => "Donated",
        }
    }

    /// Outgoing edges of the transition graph. This table is the only place
    /// the graph is written down.
    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Processing => &[OrderStatus::OutForDelivery, OrderStatus::Redistribute],
            OrderStatus::OutForDelivery => &[OrderStatus::Delivered, OrderStatus::Redistribute],
            OrderStatus::Redistribute => &[
                OrderStatus::Processing,
                OrderStatus::Cancelled,
                OrderStatus::Donated,
            ],
            OrderStatus::Cancelled => &[OrderStatus::Donated],
            OrderStatus::Delivered | OrderStatus::Donated => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Whether an order may be cancelled (and offered for redistribution)
    /// from this stage.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::OutForDelivery)
    }
}

/// Self-transitions are always legal; everything else follows
/// [`OrderStatus::allowed_next`].
pub fn can_transition(current: OrderStatus, next: OrderStatus) -> bool {
    current == next || current.allowed_next().contains(&next)
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
