//! RealtimeHub - WebSocket Event Distribution
//!
//! ## Responsibilities
//!
//! - WebSocket connection management
//! - Broadcasting violation and absence events to subscribers
//!
//! Emission queues into per-connection unbounded channels and returns
//! immediately; a slow or disconnected subscriber never blocks the
//! monitoring loop.

use crate::presence::AbsenceAlarm;
use crate::tracker::ViolationEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Hub message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum HubMessage {
    /// A new violation record became active
    Violation(ViolationEvent),
    /// The one-shot absence alarm fired
    AbsenceAlert(AbsenceAlarm),
}

/// Client connection
struct ClientConnection {
    id: Uuid,
    tx: mpsc::UnboundedSender<String>,
}

/// RealtimeHub instance
pub struct RealtimeHub {
    connections: RwLock<HashMap<Uuid, ClientConnection>>,
    connection_count: AtomicU64,
}

impl RealtimeHub {
    /// Create new RealtimeHub
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            connection_count: AtomicU64::new(0),
        }
    }

    /// Register a new client
    pub async fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<String>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut connections = self.connections.write().await;
            connections.insert(id, ClientConnection { id, tx });
        }

        self.connection_count.fetch_add(1, Ordering::Relaxed);
        tracing::info!(connection_id = %id, "Client connected");

        (id, rx)
    }

    /// Unregister a client
    pub async fn unregister(&self, id: &Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(id).is_some() {
            self.connection_count.fetch_sub(1, Ordering::Relaxed);
            tracing::info!(connection_id = %id, "Client disconnected");
        }
    }

    /// Broadcast message to all clients
    pub async fn broadcast(&self, message: HubMessage) {
        let msg_type = match &message {
            HubMessage::Violation(_) => "violation",
            HubMessage::AbsenceAlert(_) => "absence_alert",
        };

        let json = match serde_json::to_string(&message) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize message");
                return;
            }
        };

        let connections = self.connections.read().await;
        tracing::debug!(
            message_type = %msg_type,
            client_count = connections.len(),
            "Broadcasting message"
        );

        for conn in connections.values() {
            if let Err(e) = conn.tx.send(json.clone()) {
                tracing::warn!(connection_id = %conn.id, error = %e, "Failed to send message");
            }
        }
    }

    /// Get connection count
    pub fn connection_count(&self) -> u64 {
        self.connection_count.load(Ordering::Relaxed)
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::ViolationKind;
    use chrono::Utc;

    #[tokio::test]
    async fn test_broadcast_reaches_registered_client() {
        let hub = RealtimeHub::new();
        let (_, mut rx) = hub.register().await;

        hub.broadcast(HubMessage::Violation(ViolationEvent {
            person: "sv01".to_string(),
            kind: ViolationKind::LookingAway,
            timestamp: Utc::now(),
        }))
        .await;

        let raw = rx.recv().await.expect("message delivered");
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["type"], "violation");
        assert_eq!(value["data"]["person"], "sv01");
        assert_eq!(value["data"]["kind"], "looking_away");
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        let hub = RealtimeHub::new();
        let (id, mut rx) = hub.register().await;
        hub.unregister(&id).await;
        assert_eq!(hub.connection_count(), 0);

        hub.broadcast(HubMessage::AbsenceAlert(AbsenceAlarm {
            absent: vec!["sv01".to_string()],
            timestamp: Utc::now(),
        }))
        .await;

        // Sender side was dropped with the connection
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_broadcast_without_clients_is_noop() {
        let hub = RealtimeHub::new();
        hub.broadcast(HubMessage::AbsenceAlert(AbsenceAlarm {
            absent: vec![],
            timestamp: Utc::now(),
        }))
        .await;
    }
}
