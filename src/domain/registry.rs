//! Live subscription registry.
//!
//! [`SubscriptionRegistry`] owns the mapping from live connections to the
//! `(device, sensor class)` keys they are interested in. All state sits
//! behind one [`tokio::sync::RwLock`]: mutations take the write half,
//! [`SubscriptionRegistry::matches`] takes the read half and returns an
//! owned snapshot so no lock is held while readings are delivered.
//!
//! A connection only appears in the registry while it holds at least one
//! subscription. Removing its last key removes the connection entry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use super::{ConnectionId, Reading, SensorClass, SubscriptionKey};

/// Outbound queue feeding one connection's socket writer.
pub type ReadingSender = mpsc::Sender<Arc<Reading>>;

/// Why a reading could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The connection's outbound queue is full.
    #[error("outbound queue full")]
    Backpressure,
    /// The connection's writer has gone away.
    #[error("connection closed")]
    Closed,
}

/// Cloneable handle used to push readings to one live connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: ReadingSender,
}

impl ConnectionHandle {
    /// Wraps the sending half of a connection's outbound queue.
    #[must_use]
    pub fn new(id: ConnectionId, sender: ReadingSender) -> Self {
        Self { id, sender }
    }

    /// Connection identity.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a reading without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Backpressure`] when the queue is full and
    /// [`DeliveryError::Closed`] when the receiver has been dropped.
    pub fn try_deliver(&self, reading: &Arc<Reading>) -> Result<(), DeliveryError> {
        self.sender
            .try_send(Arc::clone(reading))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => DeliveryError::Backpressure,
                mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
            })
    }
}

#[derive(Debug)]
struct Subscriber {
    handle: ConnectionHandle,
    keys: HashSet<SubscriptionKey>,
}

#[derive(Debug, Default)]
struct RegistryState {
    by_connection: HashMap<ConnectionId, Subscriber>,
    by_key: HashMap<SubscriptionKey, HashSet<ConnectionId>>,
}

impl RegistryState {
    fn unlink(&mut self, key: &SubscriptionKey, id: ConnectionId) {
        if let Some(ids) = self.by_key.get_mut(key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_key.remove(key);
            }
        }
    }
}

/// Registry of which connections want which sensor streams.
///
/// Constructed once at startup and shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    state: RwLock<RegistryState>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` for the connection behind `handle`.
    ///
    /// Idempotent. Returns `true` if the key was not already held.
    pub async fn subscribe(&self, handle: &ConnectionHandle, key: SubscriptionKey) -> bool {
        let id = handle.id();
        let mut state = self.state.write().await;

        let subscriber = state.by_connection.entry(id).or_insert_with(|| Subscriber {
            handle: handle.clone(),
            keys: HashSet::new(),
        });
        if !subscriber.keys.insert(key.clone()) {
            return false;
        }
        state.by_key.entry(key).or_default().insert(id);
        true
    }

    /// Removes `key` from the connection's interests.
    ///
    /// Returns `true` if the key was held. Dropping the last key removes
    /// the connection entry.
    pub async fn unsubscribe(&self, id: ConnectionId, key: &SubscriptionKey) -> bool {
        let mut state = self.state.write().await;

        let Some(subscriber) = state.by_connection.get_mut(&id) else {
            return false;
        };
        if !subscriber.keys.remove(key) {
            return false;
        }
        let now_empty = subscriber.keys.is_empty();
        if now_empty {
            state.by_connection.remove(&id);
        }
        state.unlink(key, id);
        true
    }

    /// Forgets every subscription of a connection. Returns how many keys
    /// it held.
    pub async fn drop_connection(&self, id: ConnectionId) -> usize {
        let mut state = self.state.write().await;

        let Some(subscriber) = state.by_connection.remove(&id) else {
            return 0;
        };
        for key in &subscriber.keys {
            state.unlink(key, id);
        }
        subscriber.keys.len()
    }

    /// Snapshot of every connection subscribed to `device_id:class` or to
    /// the `device_id:all` wildcard. Each connection appears once.
    pub async fn matches(&self, device_id: &str, class: SensorClass) -> Vec<ConnectionHandle> {
        let exact = SubscriptionKey::new(device_id, class);
        let wildcard = SubscriptionKey::all(device_id);

        let state = self.state.read().await;
        let mut seen = HashSet::new();
        let mut handles = Vec::new();
        for key in [&exact, &wildcard] {
            let Some(ids) = state.by_key.get(key) else {
                continue;
            };
            for id in ids {
                if !seen.insert(*id) {
                    continue;
                }
                if let Some(subscriber) = state.by_connection.get(id) {
                    handles.push(subscriber.handle.clone());
                }
            }
        }
        handles
    }

    /// Number of connections holding at least one subscription.
    pub async fn connection_count(&self) -> usize {
        self.state.read().await.by_connection.len()
    }

    /// Number of keys held by a connection.
    pub async fn subscription_count(&self, id: ConnectionId) -> usize {
        self.state
            .read()
            .await
            .by_connection
            .get(&id)
            .map_or(0, |s| s.keys.len())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::SensorType;

    fn handle() -> (ConnectionHandle, mpsc::Receiver<Arc<Reading>>) {
        let (tx, rx) = mpsc::channel(8);
        (ConnectionHandle::new(ConnectionId::new(), tx), rx)
    }

    fn temp(device: &str) -> SubscriptionKey {
        SubscriptionKey::new(device, SensorClass::Sensor(SensorType::Temperature))
    }

    fn ids(handles: &[ConnectionHandle]) -> Vec<ConnectionId> {
        handles.iter().map(ConnectionHandle::id).collect()
    }

    #[tokio::test]
    async fn subscribe_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let (c, _rx) = handle();

        assert!(registry.subscribe(&c, temp("D")).await);
        for _ in 0..4 {
            assert!(!registry.subscribe(&c, temp("D")).await);
        }

        assert_eq!(registry.subscription_count(c.id()).await, 1);
        let found = registry
            .matches("D", SensorClass::Sensor(SensorType::Temperature))
            .await;
        assert_eq!(ids(&found), vec![c.id()]);
    }

    #[tokio::test]
    async fn wildcard_and_exact_union() {
        let registry = SubscriptionRegistry::new();
        let (all, _rx1) = handle();
        let (exact, _rx2) = handle();
        registry.subscribe(&all, SubscriptionKey::all("D")).await;
        registry.subscribe(&exact, temp("D")).await;

        let mut found = ids(
            &registry
                .matches("D", SensorClass::Sensor(SensorType::Temperature))
                .await,
        );
        found.sort_by_key(|id| *id.as_uuid());
        let mut expected = vec![all.id(), exact.id()];
        expected.sort_by_key(|id| *id.as_uuid());
        assert_eq!(found, expected);

        let humidity = registry
            .matches("D", SensorClass::Sensor(SensorType::Humidity))
            .await;
        assert_eq!(ids(&humidity), vec![all.id()]);
    }

    #[tokio::test]
    async fn connection_holding_both_keys_matches_once() {
        let registry = SubscriptionRegistry::new();
        let (c, _rx) = handle();
        registry.subscribe(&c, SubscriptionKey::all("D")).await;
        registry.subscribe(&c, temp("D")).await;

        let found = registry
            .matches("D", SensorClass::Sensor(SensorType::Temperature))
            .await;
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn other_devices_do_not_match() {
        let registry = SubscriptionRegistry::new();
        let (c, _rx) = handle();
        registry.subscribe(&c, SubscriptionKey::all("D1")).await;

        assert!(registry.matches("D2", SensorClass::All).await.is_empty());
    }

    #[tokio::test]
    async fn unsubscribing_last_key_removes_connection() {
        let registry = SubscriptionRegistry::new();
        let (c, _rx) = handle();
        registry.subscribe(&c, temp("D")).await;
        registry.subscribe(&c, SubscriptionKey::all("E")).await;
        assert_eq!(registry.connection_count().await, 1);

        assert!(registry.unsubscribe(c.id(), &temp("D")).await);
        assert_eq!(registry.connection_count().await, 1);
        assert!(!registry.unsubscribe(c.id(), &temp("D")).await);

        assert!(registry.unsubscribe(c.id(), &SubscriptionKey::all("E")).await);
        assert_eq!(registry.connection_count().await, 0);
        assert!(registry.matches("E", SensorClass::All).await.is_empty());
    }

    #[tokio::test]
    async fn drop_connection_clears_every_key() {
        let registry = SubscriptionRegistry::new();
        let (c, _rx) = handle();
        let (other, _rx2) = handle();
        for device in ["A", "B", "C"] {
            registry.subscribe(&c, SubscriptionKey::all(device)).await;
            registry.subscribe(&c, temp(device)).await;
        }
        registry.subscribe(&other, SubscriptionKey::all("A")).await;

        assert_eq!(registry.drop_connection(c.id()).await, 6);
        assert_eq!(registry.drop_connection(c.id()).await, 0);

        for device in ["A", "B", "C"] {
            let found = registry
                .matches(device, SensorClass::Sensor(SensorType::Temperature))
                .await;
            assert!(!ids(&found).contains(&c.id()));
        }
        assert_eq!(registry.connection_count().await, 1);
    }

    #[tokio::test]
    async fn try_deliver_reports_full_and_closed_queues() {
        let (tx, rx) = mpsc::channel(1);
        let c = ConnectionHandle::new(ConnectionId::new(), tx);
        let reading = Arc::new(Reading::new("D", SensorType::Light, 1.0, None, None));

        assert_eq!(c.try_deliver(&reading), Ok(()));
        assert_eq!(c.try_deliver(&reading), Err(DeliveryError::Backpressure));
        drop(rx);
        assert_eq!(c.try_deliver(&reading), Err(DeliveryError::Closed));
    }
}
