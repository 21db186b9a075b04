use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, instrument, warn};

use super::{BroadcastClient, BroadcastJob, BroadcastRequest, JobOutcome};
use crate::realtime::{ConnectionHub, ConnectionId, ServerEvent};

/// How long a claim no job refers to is kept, to catch a job enqueued after
/// the claim that made it stale.
pub const CLAIM_RETENTION: Duration = Duration::from_secs(60);

/// The job currently being offered.
struct ActiveBroadcast {
    job: BroadcastJob,
    recipients: Vec<ConnectionId>,
    next: usize,
    /// Pending pacing timer. Clearing it cancels the next push.
    next_push_at: Option<Instant>,
}

/// Latest claim time for an order and when the scheduler heard of it.
struct ClaimMark {
    at: DateTime<Utc>,
    recorded: Instant,
}

enum Step {
    Waiting,
    Finished(JobOutcome),
}

/// Offers cancelled orders to connected users one at a time.
///
/// Jobs run strictly in FIFO order and only one is active. Each push is
/// followed by `interval` before the next recipient (or, after the last one,
/// before the job counts as exhausted). A claim for the active order stops it
/// at once; a claim for any other order is remembered so a matching queued
/// job is skipped when it reaches the head.
pub struct BroadcastService {
    receiver: mpsc::Receiver<BroadcastRequest>,
    hub: ConnectionHub,
    interval: Duration,
    queue: VecDeque<BroadcastJob>,
    active: Option<ActiveBroadcast>,
    claimed: HashMap<String, ClaimMark>,
}

impl BroadcastService {
    pub fn new(buffer_size: usize, hub: ConnectionHub, interval: Duration) -> (Self, BroadcastClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            hub,
            interval,
            queue: VecDeque::new(),
            active: None,
            claimed: HashMap::new(),
        };
        (service, BroadcastClient::new(sender))
    }

    #[instrument(name = "broadcast_service", skip(self), fields(interval_ms = self.interval.as_millis() as u64))]
    pub async fn run(mut self) {
        info!("BroadcastService starting");

        loop {
            let deadline = self.active.as_ref().and_then(|active| active.next_push_at);

            tokio::select! {
                biased;

                msg = self.receiver.recv() => match msg {
                    Some(BroadcastRequest::Enqueue { job }) => self.handle_enqueue(job),
                    Some(BroadcastRequest::OrderClaimed { order_id, claimed_at }) => {
                        self.handle_order_claimed(order_id, claimed_at);
                    }
                    #[cfg(test)]
                    Some(BroadcastRequest::Snapshot { respond_to }) => {
                        let _ = respond_to.send(self.snapshot());
                    }
                    Some(BroadcastRequest::Shutdown) | None => {
                        info!(pending = self.queue.len(), "BroadcastService shutting down");
                        break;
                    }
                },

                _ = wait_for(deadline) => self.handle_timer(),
            }
        }

        info!("BroadcastService stopped");
    }

    #[instrument(fields(order_id = %job.order_id), skip(self, job))]
    fn handle_enqueue(&mut self, job: BroadcastJob) {
        self.prune_claims();
        self.queue.push_back(job);
        info!(queued = self.queue.len(), "Broadcast job queued");
        if self.active.is_none() {
            self.activate_next();
        }
    }

    #[instrument(fields(order_id = %order_id), skip(self))]
    fn handle_order_claimed(&mut self, order_id: String, claimed_at: DateTime<Utc>) {
        self.prune_claims();
        let recorded = Instant::now();
        let mark = self
            .claimed
            .entry(order_id.clone())
            .or_insert(ClaimMark { at: claimed_at, recorded });
        if claimed_at > mark.at {
            mark.at = claimed_at;
        }
        mark.recorded = recorded;

        let stops_active = self
            .active
            .as_ref()
            .is_some_and(|active| active.job.order_id == order_id && active.job.cancelled_at <= claimed_at);

        if stops_active {
            // Dropping the active job drops its pacing timer with it.
            self.finish(JobOutcome::Claimed);
            self.activate_next();
        } else {
            debug!("Claim recorded for an order that is not being broadcast");
        }
    }

    fn handle_timer(&mut self) {
        if let Step::Finished(outcome) = self.step() {
            self.finish(outcome);
            self.activate_next();
        }
    }

    /// Pulls jobs off the queue until one is waiting on its timer or the
    /// queue is empty.
    fn activate_next(&mut self) {
        while self.active.is_none() {
            let Some(job) = self.queue.pop_front() else {
                debug!("Broadcast queue idle");
                return;
            };

            if self.is_stale(&job) {
                info!(order_id = %job.order_id, "Order already claimed, skipping broadcast");
                self.forget_claim_if_unused(&job.order_id);
                continue;
            }

            let recipients = self.hub.recipients_excluding(&job.excluded_user_id);
            info!(order_id = %job.order_id, recipients = recipients.len(), "Broadcasting order one user at a time");
            self.active = Some(ActiveBroadcast { job, recipients, next: 0, next_push_at: None });

            if let Step::Finished(outcome) = self.step() {
                self.finish(outcome);
            }
        }
    }

    /// Offers the active job to its next recipient, or reports why it is done.
    fn step(&mut self) -> Step {
        let stale = match &self.active {
            Some(active) => self.is_stale(&active.job),
            None => return Step::Waiting,
        };
        let interval = self.interval;
        let Some(active) = self.active.as_mut() else {
            return Step::Waiting;
        };
        active.next_push_at = None;

        if stale {
            return Step::Finished(JobOutcome::Claimed);
        }
        let Some(&connection_id) = active.recipients.get(active.next) else {
            return Step::Finished(JobOutcome::Exhausted);
        };

        active.next += 1;
        let position = active.next;
        let total = active.recipients.len();
        match self.hub.send_to(connection_id, ServerEvent::OrderCancelled(active.job.clone())) {
            Ok(()) => info!(order_id = %active.job.order_id, connection_id, position, total, "Offer sent"),
            Err(e) => warn!(order_id = %active.job.order_id, connection_id, error = %e, "Offer not delivered, moving on"),
        }
        active.next_push_at = Some(Instant::now() + interval);
        Step::Waiting
    }

    fn finish(&mut self, outcome: JobOutcome) {
        if let Some(active) = self.active.take() {
            info!(
                order_id = %active.job.order_id,
                outcome = ?outcome,
                offered = active.next,
                "Broadcast finished"
            );
            self.forget_claim_if_unused(&active.job.order_id);
        }
    }

    /// A job is stale once its order was claimed after the cancellation that
    /// produced it.
    fn is_stale(&self, job: &BroadcastJob) -> bool {
        self.claimed
            .get(&job.order_id)
            .is_some_and(|mark| mark.at >= job.cancelled_at)
    }

    /// Drops claims older than `CLAIM_RETENTION` that no queued or active job
    /// refers to.
    fn prune_claims(&mut self) {
        let queue = &self.queue;
        let active = self.active.as_ref().map(|active| active.job.order_id.as_str());
        let before = self.claimed.len();
        self.claimed.retain(|order_id, mark| {
            mark.recorded.elapsed() < CLAIM_RETENTION
                || active == Some(order_id.as_str())
                || queue.iter().any(|job| &job.order_id == order_id)
        });
        let pruned = before - self.claimed.len();
        if pruned > 0 {
            debug!(pruned, "Expired claims dropped");
        }
    }

    fn forget_claim_if_unused(&mut self, order_id: &str) {
        if !self.queue.iter().any(|job| job.order_id == order_id) {
            self.claimed.remove(order_id);
        }
    }

    #[cfg(test)]
    fn snapshot(&self) -> super::SchedulerSnapshot {
        super::SchedulerSnapshot {
            queued: self.queue.iter().map(|job| job.order_id.clone()).collect(),
            active: self.active.as_ref().map(|active| active.job.order_id.clone()),
            claimed: self.claimed.len(),
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
