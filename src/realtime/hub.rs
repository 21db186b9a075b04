use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::ServerEvent;

pub type ConnectionId = u64;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    #[error("Connection {0} is not open")]
    Gone(ConnectionId),
}

struct Connection {
    /// Set by the `register` event; unregistered connections receive no offers.
    user_id: Option<String>,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Registry of live realtime connections.
///
/// Ids are handed out in increasing order, so sorting by id gives connection
/// order.
#[derive(Clone, Default)]
pub struct ConnectionHub {
    connections: Arc<DashMap<ConnectionId, Connection>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a connection. Events addressed to it arrive on the receiver.
    pub fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (sender, receiver) = mpsc::unbounded_channel();
        self.connections.insert(id, Connection { user_id: None, sender });
        debug!(connection_id = id, "Connection opened");
        (id, receiver)
    }

    /// Associates a connection with a user. Returns false for unknown ids.
    pub fn register(&self, id: ConnectionId, user_id: impl Into<String>) -> bool {
        let user_id = user_id.into();
        let registered = match self.connections.get_mut(&id) {
            Some(mut connection) => {
                connection.user_id = Some(user_id.clone());
                true
            }
            None => false,
        };
        if registered {
            info!(connection_id = id, user_id = %user_id, total = self.connections.len(), "User registered");
        }
        registered
    }

    pub fn disconnect(&self, id: ConnectionId) {
        if self.connections.remove(&id).is_some() {
            info!(connection_id = id, total = self.connections.len(), "Connection closed");
        }
    }

    /// Registered connections not belonging to `excluded_user_id`, in
    /// connection order.
    pub fn recipients_excluding(&self, excluded_user_id: &str) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|entry| matches!(&entry.user_id, Some(user) if user != excluded_user_id))
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn send_to(&self, id: ConnectionId, event: ServerEvent) -> Result<(), DeliveryError> {
        let connection = self.connections.get(&id).ok_or(DeliveryError::Gone(id))?;
        connection.sender.send(event).map_err(|_| DeliveryError::Gone(id))
    }

    /// Sends to every open connection, registered or not. Returns how many
    /// accepted the event.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.sender.send(event.clone()).is_ok())
            .count()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
