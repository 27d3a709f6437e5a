//! Registry of connected relay clients.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::events::decode::RelayEvent;
use crate::observability::metrics;

/// Events buffered per client before it is considered stalled.
pub const CLIENT_BUFFER: usize = 256;

/// Fan-out point between the bus subscriber and WebSocket clients.
#[derive(Debug, Clone)]
pub struct EventHub {
    clients: Arc<DashMap<u64, mpsc::Sender<String>>>,
    next_id: Arc<AtomicU64>,
    capacity: usize,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::with_capacity(CLIENT_BUFFER)
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hub buffering at most `capacity` undelivered events per client.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(0)),
            capacity: capacity.max(1),
        }
    }

    /// Add a client. Events arrive on the returned receiver as JSON text.
    pub fn register(&self) -> (u64, mpsc::Receiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.capacity);
        self.clients.insert(id, tx);
        metrics::record_ws_clients(self.clients.len());
        (id, rx)
    }

    pub fn unregister(&self, id: u64) {
        if self.clients.remove(&id).is_some() {
            metrics::record_ws_clients(self.clients.len());
        }
    }

    /// Send `event` to every client without waiting. Closed clients and
    /// clients whose buffer is full are dropped; the latter see their
    /// receiver end and disconnect. Returns the number of clients reached.
    pub fn broadcast(&self, event: &RelayEvent) -> usize {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize relay event");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut dropped = Vec::new();
        for client in self.clients.iter() {
            match client.value().try_send(text.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(client = *client.key(), "Relay client stalled, disconnecting");
                    dropped.push(*client.key());
                }
                Err(TrySendError::Closed(_)) => dropped.push(*client.key()),
            }
        }
        // Removal happens after iteration; DashMap shards stay locked while
        // an iterator holds them.
        for id in dropped {
            self.unregister(id);
        }

        metrics::record_event_relayed();
        tracing::trace!(command = %event.command, delivered, "Relayed event");
        delivered
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> RelayEvent {
        RelayEvent {
            command: "EVENT VM 1/ACTIVE/RUNNING".into(),
            data: json!({"VM": {"ID": "1"}}),
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_clients() {
        let hub = EventHub::new();
        let (_, mut a) = hub.register();
        let (_, mut b) = hub.register();

        assert_eq!(hub.broadcast(&event()), 2);
        let text = a.recv().await.unwrap();
        assert_eq!(serde_json::from_str::<RelayEvent>(&text).unwrap(), event());
        assert_eq!(b.recv().await.unwrap(), text);
    }

    #[tokio::test]
    async fn test_closed_clients_pruned() {
        let hub = EventHub::new();
        let (_, rx) = hub.register();
        let (_, _keep) = hub.register();
        drop(rx);

        assert_eq!(hub.broadcast(&event()), 1);
        assert_eq!(hub.client_count(), 1);
    }

    #[tokio::test]
    async fn test_stalled_client_disconnected() {
        let hub = EventHub::with_capacity(2);
        let (_, mut stalled) = hub.register();
        let (_, mut reader) = hub.register();

        for _ in 0..2 {
            assert_eq!(hub.broadcast(&event()), 2);
            reader.recv().await.unwrap();
        }
        // Third event finds the stalled buffer full.
        assert_eq!(hub.broadcast(&event()), 1);
        assert_eq!(hub.client_count(), 1);
        reader.recv().await.unwrap();

        // Buffered events drain, then the channel reports closed.
        assert!(stalled.recv().await.is_some());
        assert!(stalled.recv().await.is_some());
        assert!(stalled.recv().await.is_none());
    }

    #[test]
    fn test_unregister() {
        let hub = EventHub::new();
        let (id, _rx) = hub.register();
        assert_eq!(hub.client_count(), 1);
        hub.unregister(id);
        hub.unregister(id);
        assert_eq!(hub.client_count(), 0);
    }
}
