//! Fan-out of ingested readings to live subscribers.
//!
//! [`BroadcastDispatcher`] resolves subscribers through the
//! [`SubscriptionRegistry`] one reading at a time, in batch order, and
//! queues the reading on each matching connection. Delivery is
//! fire-and-forget: a full or closed queue only affects that connection.

use std::sync::Arc;

use super::registry::DeliveryError;
use super::{Reading, SensorClass, SubscriptionRegistry};

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Readings processed.
    pub readings: usize,
    /// Successful (reading, connection) deliveries.
    pub delivered: usize,
    /// Deliveries skipped because a queue was full or closed.
    pub dropped: usize,
}

/// Pushes readings to every connection subscribed to them.
#[derive(Debug, Clone)]
pub struct BroadcastDispatcher {
    registry: Arc<SubscriptionRegistry>,
}

impl BroadcastDispatcher {
    /// Creates a dispatcher reading from `registry`.
    #[must_use]
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    /// Delivers a batch of readings from an already authenticated device.
    ///
    /// Readings reach any given connection in batch order. The registry
    /// lock is released before anything is queued.
    pub async fn ingest<I>(&self, device_id: &str, readings: I) -> DispatchReport
    where
        I: IntoIterator<Item = Reading>,
    {
        let mut report = DispatchReport::default();

        for reading in readings {
            report.readings += 1;
            let targets = self
                .registry
                .matches(device_id, SensorClass::Sensor(reading.sensor_type))
                .await;
            if targets.is_empty() {
                continue;
            }

            let reading = Arc::new(reading);
            for target in &targets {
                match target.try_deliver(&reading) {
                    Ok(()) => report.delivered += 1,
                    Err(DeliveryError::Backpressure) => {
                        report.dropped += 1;
                        tracing::warn!(
                            connection_id = %target.id(),
                            device_id,
                            sensor_type = %reading.sensor_type,
                            "subscriber queue full, reading dropped"
                        );
                    }
                    Err(DeliveryError::Closed) => {
                        report.dropped += 1;
                        tracing::debug!(connection_id = %target.id(), "subscriber already closed");
                    }
                }
            }
        }

        tracing::debug!(
            device_id,
            readings = report.readings,
            delivered = report.delivered,
            dropped = report.dropped,
            "batch dispatched"
        );
        report
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{ConnectionHandle, ConnectionId, SensorType, SubscriptionKey};

    fn reading(sensor: SensorType, value: f64) -> Reading {
        Reading::new("D", sensor, value, None, None)
    }

    fn connection(capacity: usize) -> (ConnectionHandle, mpsc::Receiver<Arc<Reading>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (ConnectionHandle::new(ConnectionId::new(), tx), rx)
    }

    fn drain(rx: &mut mpsc::Receiver<Arc<Reading>>) -> Vec<f64> {
        let mut values = Vec::new();
        while let Ok(r) = rx.try_recv() {
            values.push(r.value);
        }
        values
    }

    #[tokio::test]
    async fn preserves_batch_order_per_connection() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let dispatcher = BroadcastDispatcher::new(Arc::clone(&registry));
        let (c, mut rx) = connection(16);
        registry.subscribe(&c, SubscriptionKey::all("D")).await;

        let batch = vec![
            reading(SensorType::Temperature, 1.0),
            reading(SensorType::Humidity, 2.0),
            reading(SensorType::WaterLevel, 3.0),
        ];
        let report = dispatcher.ingest("D", batch).await;

        assert_eq!(report.readings, 3);
        assert_eq!(report.delivered, 3);
        assert_eq!(drain(&mut rx), vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn routes_by_sensor_and_wildcard() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let dispatcher = BroadcastDispatcher::new(Arc::clone(&registry));
        let (all, mut all_rx) = connection(16);
        let (temp, mut temp_rx) = connection(16);
        registry.subscribe(&all, SubscriptionKey::all("D")).await;
        registry
            .subscribe(
                &temp,
                SubscriptionKey::new("D", SensorClass::Sensor(SensorType::Temperature)),
            )
            .await;

        dispatcher
            .ingest(
                "D",
                vec![
                    reading(SensorType::Temperature, 30.0),
                    reading(SensorType::Humidity, 60.0),
                ],
            )
            .await;

        assert_eq!(drain(&mut all_rx), vec![30.0, 60.0]);
        assert_eq!(drain(&mut temp_rx), vec![30.0]);
    }

    #[tokio::test]
    async fn connection_with_both_keys_gets_one_copy() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let dispatcher = BroadcastDispatcher::new(Arc::clone(&registry));
        let (c, mut rx) = connection(16);
        registry.subscribe(&c, SubscriptionKey::all("D")).await;
        registry
            .subscribe(
                &c,
                SubscriptionKey::new("D", SensorClass::Sensor(SensorType::Light)),
            )
            .await;

        let report = dispatcher
            .ingest("D", vec![reading(SensorType::Light, 500.0)])
            .await;
        assert_eq!(report.delivered, 1);
        assert_eq!(drain(&mut rx), vec![500.0]);
    }

    #[tokio::test]
    async fn failed_connection_does_not_block_siblings() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let dispatcher = BroadcastDispatcher::new(Arc::clone(&registry));
        let (closed, closed_rx) = connection(16);
        let (slow, _slow_rx) = connection(1);
        let (healthy, mut healthy_rx) = connection(16);
        for c in [&closed, &slow, &healthy] {
            registry.subscribe(c, SubscriptionKey::all("D")).await;
        }
        drop(closed_rx);

        let batch = vec![
            reading(SensorType::Temperature, 1.0),
            reading(SensorType::Temperature, 2.0),
        ];
        let report = dispatcher.ingest("D", batch).await;

        // healthy: 2, slow: 1 then full, closed: 0
        assert_eq!(report.delivered, 3);
        assert_eq!(report.dropped, 3);
        assert_eq!(drain(&mut healthy_rx), vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn no_subscribers_is_not_an_error() {
        let dispatcher = BroadcastDispatcher::new(Arc::new(SubscriptionRegistry::new()));
        let report = dispatcher
            .ingest("D", vec![reading(SensorType::Vibration, 0.4)])
            .await;
        assert_eq!(
            report,
            DispatchReport {
                readings: 1,
                delivered: 0,
                dropped: 0
            }
        );
    }
}
