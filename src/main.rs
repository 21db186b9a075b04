mod actor_framework;
mod app_system;
mod broadcast;
mod clients;
mod domain;
mod http;
mod lifecycle;
mod order_actor;
mod realtime;
mod reroute_actor;
mod shelter_actor;

#[cfg(test)]
mod mock_framework;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::app_system::{setup_tracing, Config, RedistributionSystem};
use crate::http::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = Config::from_env();
    let system = RedistributionSystem::new(&config);

    if config.seed_shelters {
        match system.lifecycle.seed_shelters().await {
            Ok(Some(count)) => info!(count, "Default shelters seeded"),
            Ok(None) => {}
            Err(e) => error!(error = %e, "Shelter seeding failed"),
        }
    }

    let addr = config.socket_addr().context("invalid BIND_ADDR/HTTP_PORT")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "HTTP server listening");

    let app = build_app(AppState::new(system.lifecycle.clone(), system.hub.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    system.shutdown().await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, shutting down");
}
