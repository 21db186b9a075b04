use tracing::{debug, instrument};

use crate::actor_framework::{Filter, ResourceClient};
use crate::clients::StoreError;
use crate::domain::RerouteRecord;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

/// Client for the reroute audit log.
#[derive(Clone)]
pub struct RerouteClient {
    inner: ResourceClient<RerouteRecord>,
}

impl_basic_client!(RerouteClient, RerouteRecord, reroute);

/// One page of reroute history.
#[derive(Debug, Clone, PartialEq)]
pub struct ReroutePage {
    pub rows: Vec<RerouteRecord>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

impl RerouteClient {
    /// Newest first, optionally narrowed to one order. `page` is 1-based and
    /// clamped to at least 1; `limit` defaults to 20 and is clamped to `1..=100`.
    #[instrument(skip(self))]
    pub async fn page(
        &self,
        order_id: Option<String>,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Result<ReroutePage, StoreError> {
        debug!("Sending request");
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let filter = match order_id {
            Some(order_id) => Filter::new(move |r: &RerouteRecord| r.order_id == order_id),
            None => Filter::all(),
        };
        let mut records = self.inner.list(filter).await?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        let total = records.len();
        let rows = records.into_iter().skip((page - 1).saturating_mul(limit)).take(limit).collect();

        Ok(ReroutePage { rows, page, limit, total })
    }
}
