use tracing::{debug, instrument};

use crate::actor_framework::{Filter, ResourceClient};
use crate::clients::StoreError;
use crate::domain::{Order, OrderChange, OrderPatch, OrderStatus};

/// Client for the order store.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl_basic_client!(OrderClient, Order, order);

impl OrderClient {
    /// Applies `change` only if the order is still in `expected`.
    /// A lost race comes back as [`StoreError::Conflict`].
    #[instrument(skip(self, change), fields(expected = %expected))]
    pub async fn update_order_if(
        &self,
        id: String,
        expected: OrderStatus,
        change: OrderChange,
    ) -> Result<Order, StoreError> {
        debug!("Sending request");
        self.inner
            .update(id, OrderPatch::guarded(expected, change))
            .await
            .map_err(StoreError::from)
    }

    /// Every order, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        debug!("Sending request");
        let orders = self.inner.list(Filter::all()).await?;
        Ok(newest_first(orders))
    }

    /// Orders the user currently owns or has claimed, newest first.
    #[instrument(skip(self))]
    pub async fn orders_for_user(&self, user_id: String) -> Result<Vec<Order>, StoreError> {
        debug!("Sending request");
        let orders = self
            .inner
            .list(Filter::new(move |order: &Order| order.is_held_by(&user_id)))
            .await?;
        Ok(newest_first(orders))
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    orders
}
