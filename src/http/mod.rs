//! HTTP surface: JSON routes over the lifecycle service plus the realtime
//! upgrade endpoint.

mod orders;
mod response;
mod shelters;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::lifecycle::OrderLifecycle;
use crate::realtime::{socket, ConnectionHub};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: OrderLifecycle,
    pub hub: ConnectionHub,
}

impl AppState {
    pub fn new(lifecycle: OrderLifecycle, hub: ConnectionHub) -> Self {
        Self { lifecycle, hub }
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "API Working" }))
        .route("/ws", get(socket::ws_handler))
        .merge(orders::router())
        .merge(shelters::router())
}

/// Build the application with middleware and state applied.
pub fn build_app(state: AppState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
