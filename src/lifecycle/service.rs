use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::broadcast::{BroadcastClient, BroadcastJob};
use crate::clients::{OrderClient, RerouteClient, ReroutePage, ShelterClient, StoreError};
use crate::domain::{
    can_transition, Order, OrderChange, OrderCreate, OrderStatus, RerouteCreate, Shelter,
    ShelterAssignment,
};
use crate::order_actor::OrderError;
use crate::realtime::{ClaimSignal, ConnectionHub, ServerEvent};

/// Result of `update_status`.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    Unchanged(Order),
    Updated(Order),
}

/// Result of `assign_shelter`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignOutcome {
    pub order: Order,
    /// The order already had a shelter; nothing was changed.
    pub already_assigned: bool,
    /// False when the order was donated but its reroute record could not be
    /// written.
    pub audit_recorded: bool,
}

/// Orchestrates order lifecycle operations across the stores, the broadcast
/// scheduler and the realtime hub.
///
/// Every state change is a guarded write: the store applies it only if the
/// order is still in the status this service read, so two concurrent callers
/// can never both succeed.
#[derive(Clone)]
pub struct OrderLifecycle {
    orders: OrderClient,
    shelters: ShelterClient,
    reroutes: RerouteClient,
    broadcast: BroadcastClient,
    hub: ConnectionHub,
}

impl OrderLifecycle {
    pub fn new(
        orders: OrderClient,
        shelters: ShelterClient,
        reroutes: RerouteClient,
        broadcast: BroadcastClient,
        hub: ConnectionHub,
    ) -> Self {
        Self { orders, shelters, reroutes, broadcast, hub }
    }

    async fn load_order(&self, order_id: &str) -> Result<Order, OrderError> {
        self.orders
            .get_order(order_id.to_string())
            .await?
            .ok_or(OrderError::NotFound("Order"))
    }

    async fn load_shelter(&self, shelter_id: &str) -> Result<Shelter, OrderError> {
        self.shelters
            .get_shelter(shelter_id.to_string())
            .await?
            .ok_or(OrderError::NotFound("Shelter"))
    }

    /// Releases an order for redistribution and queues its broadcast.
    #[instrument(skip(self))]
    pub async fn cancel(&self, order_id: &str, user_id: &str) -> Result<Order, OrderError> {
        let order = self.load_order(order_id).await?;

        if !order.is_held_by(user_id) {
            warn!(owner = %order.user_id, "Cancel refused: requester does not hold the order");
            return Err(OrderError::Unauthorized);
        }
        if !order.status.is_cancellable() {
            return Err(OrderError::invalid_transition(order.status, OrderStatus::Redistribute));
        }

        let cancelled_at = Utc::now();
        let order = self
            .orders
            .update_order_if(order_id.to_string(), order.status, OrderChange::Cancel)
            .await?;
        info!("Order released for redistribution");

        self.broadcast
            .enqueue(BroadcastJob::for_cancelled(&order, user_id, cancelled_at))
            .await;
        Ok(order)
    }

    /// Transfers a redistributed order to `user_id`.
    ///
    /// A lost race and a never-available order produce the same error.
    #[instrument(skip(self))]
    pub async fn claim(&self, order_id: &str, user_id: &str) -> Result<Order, OrderError> {
        let order = self.load_order(order_id).await?;
        if order.status != OrderStatus::Redistribute {
            return Err(OrderError::not_available_for_claim());
        }

        let claimed_at = Utc::now();
        let change = OrderChange::Claim { user_id: user_id.to_string(), at: claimed_at };
        let order = match self
            .orders
            .update_order_if(order_id.to_string(), OrderStatus::Redistribute, change)
            .await
        {
            Ok(order) => order,
            Err(StoreError::Conflict(reason)) | Err(StoreError::Rejected(reason)) => {
                info!(reason = %reason, "Claim lost to a concurrent claim");
                return Err(OrderError::not_available_for_claim());
            }
            Err(e) => return Err(e.into()),
        };
        info!(original_owner = ?order.original_user_id, "Order claimed");

        self.broadcast.order_claimed(order_id.to_string(), claimed_at).await;
        let notified = self.hub.broadcast(ServerEvent::OrderClaimed(ClaimSignal {
            order_id: order_id.to_string(),
            user_id: user_id.to_string(),
        }));
        info!(notified, "Claim announced");

        Ok(order)
    }

    /// Re-signals a claim `user_id` already won, e.g. a socket `claimOrder`
    /// sent after the HTTP claim succeeded. Returns false if the order is not
    /// currently claimed by that user.
    #[instrument(skip(self))]
    pub async fn confirm_claim(&self, order_id: &str, user_id: &str) -> Result<bool, OrderError> {
        let order = self.load_order(order_id).await?;
        let (Some(claimed_by), Some(claimed_at)) = (order.claimed_by.as_deref(), order.claimed_at) else {
            return Ok(false);
        };
        if claimed_by != user_id {
            return Ok(false);
        }

        self.broadcast.order_claimed(order_id.to_string(), claimed_at).await;
        debug!("Claim already held, broadcast stop forwarded");
        Ok(true)
    }

    /// Admin status change, validated against the transition table.
    #[instrument(skip(self))]
    pub async fn update_status(&self, order_id: &str, requested: &str) -> Result<StatusUpdate, OrderError> {
        let requested: OrderStatus = requested
            .parse()
            .map_err(|_| OrderError::InvalidValue(requested.to_string()))?;

        let order = self.load_order(order_id).await?;
        if order.status == requested {
            return Ok(StatusUpdate::Unchanged(order));
        }
        if !can_transition(order.status, requested) {
            return Err(OrderError::invalid_transition(order.status, requested));
        }

        let from = order.status;
        let order = self
            .orders
            .update_order_if(order_id.to_string(), from, OrderChange::Status(requested))
            .await?;
        info!(from = %from, to = %requested, "Order status updated");
        Ok(StatusUpdate::Updated(order))
    }

    /// Donates a redistributed or cancelled order to a shelter and records
    /// the reroute. Calling it again for an assigned order changes nothing.
    #[instrument(skip(self))]
    pub async fn assign_shelter(
        &self,
        order_id: Option<&str>,
        shelter_id: Option<&str>,
    ) -> Result<AssignOutcome, OrderError> {
        let (Some(order_id), Some(shelter_id)) = (
            order_id.filter(|id| !id.is_empty()),
            shelter_id.filter(|id| !id.is_empty()),
        ) else {
            return Err(OrderError::MissingParameter("orderId and shelterId are required".to_string()));
        };

        let order = self.load_order(order_id).await?;
        let shelter = self.load_shelter(shelter_id).await?;

        if order.shelter.is_some() {
            info!("Shelter already assigned");
            return Ok(AssignOutcome { order, already_assigned: true, audit_recorded: true });
        }
        if !matches!(order.status, OrderStatus::Redistribute | OrderStatus::Cancelled) {
            return Err(OrderError::InvalidState(format!(
                "Only redistributed or cancelled orders can be assigned to a shelter (status is '{}')",
                order.status
            )));
        }

        let assignment = ShelterAssignment {
            shelter_id: shelter.id.clone(),
            shelter_name: shelter.name.clone(),
            contact_email: shelter.contact_email.clone(),
            contact_phone: shelter.contact_phone.clone(),
            address: shelter.address.one_line(),
        };

        let order = match self
            .orders
            .update_order_if(order_id.to_string(), order.status, OrderChange::Donate(assignment.clone()))
            .await
        {
            Ok(order) => order,
            Err(StoreError::Conflict(_)) => {
                // Someone else got there first; if it was another assignment
                // this call is simply a repeat.
                let current = self.load_order(order_id).await?;
                if current.shelter.is_some() {
                    return Ok(AssignOutcome { order: current, already_assigned: true, audit_recorded: true });
                }
                return Err(OrderError::InvalidState("Order status changed concurrently".to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        info!(shelter = %assignment.shelter_name, "Order donated");

        let record = RerouteCreate {
            order_id: order.id.clone(),
            shelter_id: assignment.shelter_id,
            shelter_name: assignment.shelter_name,
            shelter_address: assignment.address,
            shelter_contact_email: assignment.contact_email,
            shelter_contact_phone: assignment.contact_phone,
            items: order.items.clone(),
            total: order.amount,
        };
        let audit_recorded = match self.reroutes.create_reroute(record).await {
            Ok(record) => {
                info!(reroute_id = %record.id, "Reroute recorded");
                true
            }
            Err(e) => {
                error!(error = %e, "Order donated but its reroute record was not written");
                false
            }
        };

        Ok(AssignOutcome { order, already_assigned: false, audit_recorded })
    }

    #[instrument(skip(self, params), fields(user_id = %params.user_id, items = params.items.len()))]
    pub async fn place_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        match self.orders.create_order(params).await {
            Ok(order) => {
                info!(order_id = %order.id, "Order placed");
                Ok(order)
            }
            Err(StoreError::Rejected(reason)) => Err(OrderError::InvalidState(format!("Invalid order: {}", reason))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_orders().await?)
    }

    pub async fn user_orders(&self, user_id: &str) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.orders_for_user(user_id.to_string()).await?)
    }

    pub async fn active_shelters(&self) -> Result<Vec<Shelter>, OrderError> {
        Ok(self.shelters.active_shelters().await?)
    }

    pub async fn seed_shelters(&self) -> Result<Option<usize>, OrderError> {
        Ok(self.shelters.seed_defaults().await?)
    }

    pub async fn reroute_history(
        &self,
        order_id: Option<String>,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Result<ReroutePage, OrderError> {
        Ok(self.reroutes.page(order_id, page, limit).await?)
    }
}
