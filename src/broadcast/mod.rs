//! Redistribution broadcast scheduler.

mod job;
mod service;

pub use job::*;
pub use service::BroadcastService;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
#[cfg(test)]
use tokio::sync::oneshot;
use tracing::{debug, error, instrument};

#[derive(Debug)]
pub enum BroadcastRequest {
    Enqueue {
        job: BroadcastJob,
    },
    OrderClaimed {
        order_id: String,
        claimed_at: DateTime<Utc>,
    },
    Shutdown,
    #[cfg(test)]
    Snapshot {
        respond_to: oneshot::Sender<SchedulerSnapshot>,
    },
}

/// Internal scheduler state, for tests.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSnapshot {
    pub queued: Vec<String>,
    pub active: Option<String>,
    pub claimed: usize,
}

/// Handle to the [`BroadcastService`]. Every method is fire-and-forget: the
/// scheduler runs after the triggering request has been answered, so its
/// failures are logged here and never returned.
#[derive(Clone)]
pub struct BroadcastClient {
    sender: mpsc::Sender<BroadcastRequest>,
}

impl BroadcastClient {
    pub fn new(sender: mpsc::Sender<BroadcastRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self, job), fields(order_id = %job.order_id))]
    pub async fn enqueue(&self, job: BroadcastJob) {
        debug!("Sending request");
        if let Err(e) = self.sender.send(BroadcastRequest::Enqueue { job }).await {
            error!(error = %e, "Broadcast scheduler unavailable, job dropped");
        }
    }

    /// Stops any broadcast for `order_id` that predates `claimed_at`.
    #[instrument(skip(self))]
    pub async fn order_claimed(&self, order_id: String, claimed_at: DateTime<Utc>) {
        debug!("Sending request");
        if let Err(e) = self.sender.send(BroadcastRequest::OrderClaimed { order_id, claimed_at }).await {
            error!(error = %e, "Broadcast scheduler unavailable, claim not forwarded");
        }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        debug!("Sending shutdown request");
        let _ = self.sender.send(BroadcastRequest::Shutdown).await;
    }

    // Test-only method for internal state inspection
    #[cfg(test)]
    pub async fn snapshot(&self) -> Option<SchedulerSnapshot> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(BroadcastRequest::Snapshot { respond_to }).await.ok()?;
        response.await.ok()
    }
}
