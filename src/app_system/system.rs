use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

use super::Config;
use crate::actor_framework::ResourceActor;
use crate::broadcast::{BroadcastClient, BroadcastService};
use crate::clients::{OrderClient, RerouteClient, ShelterClient};
use crate::domain::{Order, RerouteRecord, Shelter};
use crate::lifecycle::OrderLifecycle;
use crate::realtime::ConnectionHub;

fn next_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The running application: store actors, the broadcast scheduler, the
/// connection hub, and the lifecycle service wired over them.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct RedistributionSystem {
    pub lifecycle: OrderLifecycle,
    pub hub: ConnectionHub,
    broadcast: BroadcastClient,
    handles: Vec<JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl RedistributionSystem {
    /// Spawns every actor. Must be called inside a tokio runtime.
    pub fn new(config: &Config) -> Self {
        info!(?config, "Starting redistribution system");
        let buffer = config.actor_buffer_size;

        // 1. Stores
        let (order_actor, order_inner) = ResourceActor::<Order>::new(buffer, next_id);
        let (shelter_actor, shelter_inner) = ResourceActor::<Shelter>::new(buffer, next_id);
        let (reroute_actor, reroute_inner) = ResourceActor::<RerouteRecord>::new(buffer, next_id);

        // 2. Realtime registry and the scheduler that pushes through it
        let hub = ConnectionHub::new();
        let (broadcast_service, broadcast) =
            BroadcastService::new(buffer, hub.clone(), config.broadcast_interval());

        let handles = vec![
            tokio::spawn(order_actor.run()),
            tokio::spawn(shelter_actor.run()),
            tokio::spawn(reroute_actor.run()),
            tokio::spawn(broadcast_service.run()),
        ];

        // 3. Lifecycle service over all of them
        let lifecycle = OrderLifecycle::new(
            OrderClient::new(order_inner),
            ShelterClient::new(shelter_inner),
            RerouteClient::new(reroute_inner),
            broadcast.clone(),
            hub.clone(),
        );

        Self {
            lifecycle,
            hub,
            broadcast,
            handles,
            shutdown_timeout: config.shutdown_timeout(),
        }
    }

    /// Stops the scheduler and drops the store clients so each actor drains
    /// and exits. Callers must drop their own clones of the lifecycle first,
    /// or the stores outlive the timeout and are reported as such.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        info!("Shutting down system...");
        self.broadcast.shutdown().await;
        drop(self.lifecycle);
        drop(self.broadcast);

        let mut failed = 0usize;
        for handle in self.handles {
            match timeout(self.shutdown_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(error = %e, "Actor task failed");
                    failed += 1;
                }
                Err(_) => warn!("Actor did not stop before the shutdown timeout"),
            }
        }

        if failed > 0 {
            anyhow::bail!("{} actor task(s) failed during shutdown", failed);
        }
        info!("System shutdown complete.");
        Ok(())
    }
}
