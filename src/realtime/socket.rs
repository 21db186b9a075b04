use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use super::{ClaimReply, ClientEvent, ConnectionHub, ConnectionId, ServerEvent};
use crate::http::AppState;
use crate::lifecycle::OrderLifecycle;

/// GET /ws
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (connection_id, mut outbound) = state.hub.connect();
    info!(connection_id, total = state.hub.connection_count(), "Realtime connection opened");

    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!(connection_id, error = %e, "Failed to encode event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => handle_client_event(&state.lifecycle, &state.hub, connection_id, event).await,
                Err(e) => warn!(connection_id, error = %e, "Ignoring unrecognised frame"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(connection_id, error = %e, "Socket read failed");
                break;
            }
        }
    }

    state.hub.disconnect(connection_id);
    writer.abort();
    info!(connection_id, "Realtime connection closed");
}

/// Applies one client frame. Claims go through the same lifecycle path as
/// HTTP claims; the outcome is sent back to this connection only.
pub async fn handle_client_event(
    lifecycle: &OrderLifecycle,
    hub: &ConnectionHub,
    connection_id: ConnectionId,
    event: ClientEvent,
) {
    match event {
        ClientEvent::Register(user_id) => {
            hub.register(connection_id, user_id);
        }
        ClientEvent::ClaimOrder(signal) => {
            let reply = match lifecycle.claim(&signal.order_id, &signal.user_id).await {
                Ok(_) => claimed_reply(),
                // The client may announce a claim it already won over HTTP;
                // that frame only has to stop the broadcast.
                Err(e) => match lifecycle.confirm_claim(&signal.order_id, &signal.user_id).await {
                    Ok(true) => claimed_reply(),
                    _ => ClaimReply { success: false, message: e.public_message("Error claiming order") },
                },
            };
            if let Err(e) = hub.send_to(connection_id, ServerEvent::ClaimResult(reply)) {
                debug!(error = %e, "Claim result not delivered");
            }
        }
    }
}

fn claimed_reply() -> ClaimReply {
    ClaimReply { success: true, message: "Order successfully claimed".to_string() }
}
