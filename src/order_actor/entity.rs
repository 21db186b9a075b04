use chrono::Utc;

use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{can_transition, Order, OrderChange, OrderCreate, OrderPatch, OrderStatus};

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = OrderPatch;

    const NAME: &'static str = "order";

    fn id(&self) -> &String { &self.id }

    /// Creates a new Order from creation parameters.
    ///
    /// # Notes
    /// The order starts in `Food Processing` with no claim or shelter data.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, FrameworkError> {
        if params.user_id.is_empty() {
            return Err(FrameworkError::Rejected("userId is required".to_string()));
        }
        if params.items.is_empty() {
            return Err(FrameworkError::Rejected("order has no items".to_string()));
        }
        if !params.amount.is_finite() || params.amount < 0.0 {
            return Err(FrameworkError::Rejected(format!("invalid amount: {}", params.amount)));
        }

        Ok(Self {
            id,
            user_id: params.user_id,
            claimed_by: None,
            claimed_at: None,
            original_user_id: None,
            status: OrderStatus::Processing,
            items: params.items,
            amount: params.amount,
            shelter: None,
            created_at: Utc::now(),
        })
    }

    /// Applies one lifecycle change.
    ///
    /// The status guard is checked first, so a stale caller gets
    /// `PreconditionFailed` regardless of which change it asked for.
    fn on_update(&mut self, patch: OrderPatch) -> Result<(), FrameworkError> {
        if let Some(expected) = patch.expected_status {
            if self.status != expected {
                return Err(FrameworkError::PreconditionFailed(format!(
                    "status is {}, expected {}",
                    self.status, expected
                )));
            }
        }

        match patch.change {
            OrderChange::Cancel => {
                if !self.status.is_cancellable() {
                    return Err(FrameworkError::Rejected(format!("cannot cancel from {}", self.status)));
                }
                self.status = OrderStatus::Redistribute;
                self.claimed_by = None;
                self.claimed_at = None;
            }
            OrderChange::Claim { user_id, at } => {
                if self.status != OrderStatus::Redistribute {
                    return Err(FrameworkError::PreconditionFailed(format!("status is {}", self.status)));
                }
                if self.original_user_id.is_none() {
                    self.original_user_id = Some(self.user_id.clone());
                }
                self.user_id = user_id.clone();
                self.claimed_by = Some(user_id);
                self.claimed_at = Some(at);
                self.status = OrderStatus::Processing;
            }
            OrderChange::Status(next) => {
                if self.status.is_terminal() && next != self.status {
                    return Err(FrameworkError::Rejected(format!("{} is final", self.status)));
                }
                if !can_transition(self.status, next) {
                    return Err(FrameworkError::Rejected(format!("{} -> {}", self.status, next)));
                }
                self.status = next;
            }
            OrderChange::Donate(assignment) => {
                if self.shelter.is_some() {
                    return Err(FrameworkError::PreconditionFailed("shelter already assigned".to_string()));
                }
                if self.status == OrderStatus::Cancelled {
                    self.status = OrderStatus::Redistribute;
                }
                if !can_transition(self.status, OrderStatus::Donated) || self.status == OrderStatus::Donated {
                    return Err(FrameworkError::Rejected(format!("cannot donate from {}", self.status)));
                }
                self.status = OrderStatus::Donated;
                self.shelter = Some(assignment);
            }
        }
        Ok(())
    }
}
