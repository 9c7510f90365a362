//! Alert evaluator: pulls the latest reading per sensor for every
//! threshold-configured device and ranks the violations.
//!
//! Nothing is cached between calls. Each evaluation is a fresh pass over
//! whatever the store returns at that moment.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::alert::classify;
use crate::domain::{AlertType, SensorType, Severity};
use crate::error::GatewayError;
use crate::store::{DeviceRecord, SensorStore, StoredReading};

/// One threshold violation ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Stable identifier: `alert_{devicePk}_{sensorType}_{timestampMillis}`.
    pub id: String,
    /// Public device identifier.
    pub device_id: String,
    /// Device display name.
    pub device_name: String,
    /// Device installation site.
    pub location: Option<String>,
    /// Sensor that violated.
    pub sensor_type: SensorType,
    /// Offending value.
    pub value: f64,
    /// Unit of `value`.
    pub unit: String,
    /// Device minimum bound.
    pub threshold_min: Option<f64>,
    /// Device maximum bound.
    pub threshold_max: Option<f64>,
    /// Bound that was crossed.
    pub alert_type: AlertType,
    /// Time of the offending reading.
    pub timestamp: DateTime<Utc>,
    /// Urgency tier.
    pub severity: Severity,
}

impl Alert {
    fn new(
        device: &DeviceRecord,
        reading: &StoredReading,
        alert_type: AlertType,
        severity: Severity,
    ) -> Self {
        Self {
            id: format!(
                "alert_{}_{}_{}",
                device.id,
                reading.sensor_type,
                reading.timestamp.timestamp_millis()
            ),
            device_id: device.device_id.clone(),
            device_name: device.name.clone(),
            location: device.location.clone(),
            sensor_type: reading.sensor_type,
            value: reading.value,
            unit: reading.unit.clone(),
            threshold_min: device.thresholds.min,
            threshold_max: device.thresholds.max,
            alert_type,
            timestamp: reading.timestamp,
            severity,
        }
    }
}

/// Limits applied by [`AlertEvaluator::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorLimits {
    /// Newest readings scanned per device.
    pub scan_depth: u32,
    /// Result size when the caller gives none.
    pub default_limit: usize,
    /// Hard cap on the result size.
    pub max_limit: usize,
}

impl Default for EvaluatorLimits {
    fn default() -> Self {
        Self {
            scan_depth: 10,
            default_limit: 50,
            max_limit: 500,
        }
    }
}

/// Computes ranked threshold alerts on demand.
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    store: Arc<dyn SensorStore>,
    limits: EvaluatorLimits,
}

impl AlertEvaluator {
    /// Creates an evaluator over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SensorStore>, limits: EvaluatorLimits) -> Self {
        Self { store, limits }
    }

    /// Evaluates every active, threshold-configured device.
    ///
    /// Only the newest reading of each sensor type is checked. Results are
    /// sorted newest first and truncated to `limit` (default
    /// [`EvaluatorLimits::default_limit`], capped at
    /// [`EvaluatorLimits::max_limit`]).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if any store read fails.
    /// No partial result is returned.
    pub async fn evaluate(&self, limit: Option<usize>) -> Result<Vec<Alert>, GatewayError> {
        let limit = limit
            .unwrap_or(self.limits.default_limit)
            .min(self.limits.max_limit);

        let devices = self.store.threshold_devices().await?;
        let mut alerts = Vec::new();

        for device in &devices {
            let recent = self
                .store
                .recent_readings(device.id, self.limits.scan_depth)
                .await?;
            alerts.extend(latest_violations(device, &recent));
        }

        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        alerts.truncate(limit);

        tracing::debug!(devices = devices.len(), alerts = alerts.len(), "alerts evaluated");
        Ok(alerts)
    }
}

/// Checks the first reading of each sensor type in `recent` (newest first).
fn latest_violations(device: &DeviceRecord, recent: &[StoredReading]) -> Vec<Alert> {
    let mut seen = HashSet::new();
    recent
        .iter()
        .filter(|r| seen.insert(r.sensor_type))
        .filter_map(|r| {
            let v = classify(r.sensor_type, r.value, &device.thresholds)?;
            Some(Alert::new(device, r, v.alert_type, v.severity))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{DeviceType, Reading, ThresholdConfig};
    use crate::store::MemoryStore;

    fn device(name: &str, device_type: DeviceType, thresholds: ThresholdConfig) -> DeviceRecord {
        DeviceRecord {
            id: Uuid::new_v4(),
            device_id: name.to_string(),
            name: format!("{name} node"),
            location: Some("Bandung".to_string()),
            device_type,
            thresholds,
            is_active: true,
        }
    }

    fn evaluator(store: &Arc<MemoryStore>) -> AlertEvaluator {
        let dyn_store: Arc<dyn SensorStore> = Arc::clone(store) as Arc<dyn SensorStore>;
        AlertEvaluator::new(dyn_store, EvaluatorLimits::default())
    }

    async fn record(
        store: &MemoryStore,
        device: &DeviceRecord,
        sensor: SensorType,
        value: f64,
        at: DateTime<Utc>,
    ) {
        let r = Reading::new(device.device_id.clone(), sensor, value, None, Some(at));
        store.insert_reading(device.id, &r).await;
    }

    #[tokio::test]
    async fn classifies_latest_reading_per_sensor() {
        let store = Arc::new(MemoryStore::new());
        let d = device(
            "ESP32_DEMO_1",
            DeviceType::Esp32Climate,
            ThresholdConfig::new(Some(20.0), Some(35.0)),
        );
        store.insert_device(d.clone(), "k").await;
        let now = Utc::now();
        // only the newest temperature counts
        record(&store, &d, SensorType::Temperature, 90.0, now - Duration::minutes(5)).await;
        record(&store, &d, SensorType::Temperature, 45.5, now).await;
        record(&store, &d, SensorType::Humidity, 21.0, now).await;

        let Ok(alerts) = evaluator(&store).evaluate(None).await else {
            panic!("evaluation failed");
        };
        assert_eq!(alerts.len(), 1);
        let Some(alert) = alerts.first() else {
            panic!("expected an alert");
        };
        assert_eq!(alert.sensor_type, SensorType::Temperature);
        assert_eq!(alert.value, 45.5);
        assert_eq!(alert.alert_type, AlertType::High);
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.device_name, "ESP32_DEMO_1 node");
        assert_eq!(alert.threshold_min, Some(20.0));
        assert_eq!(alert.unit, "°C");
        assert!(alert.id.starts_with(&format!("alert_{}_TEMPERATURE_", d.id)));
    }

    #[tokio::test]
    async fn low_violation_is_critical_at_fifty_percent() {
        let store = Arc::new(MemoryStore::new());
        let d = device(
            "D",
            DeviceType::Esp32Climate,
            ThresholdConfig::new(Some(20.0), Some(35.0)),
        );
        store.insert_device(d.clone(), "k").await;
        record(&store, &d, SensorType::Temperature, 10.0, Utc::now()).await;

        let Ok(alerts) = evaluator(&store).evaluate(None).await else {
            panic!("evaluation failed");
        };
        let Some(alert) = alerts.first() else {
            panic!("expected an alert");
        };
        assert_eq!(alert.alert_type, AlertType::Low);
        assert_eq!(alert.severity, Severity::Critical);
    }

    #[tokio::test]
    async fn truncates_to_most_recent() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let bounds = ThresholdConfig::new(None, Some(10.0));
        let a = device("A", DeviceType::Esp32Climate, bounds);
        let b = device("B", DeviceType::Esp32Ground, bounds);
        store.insert_device(a.clone(), "k").await;
        store.insert_device(b.clone(), "k").await;

        record(&store, &a, SensorType::Temperature, 50.0, now - Duration::minutes(4)).await;
        record(&store, &a, SensorType::Humidity, 50.0, now - Duration::minutes(1)).await;
        record(&store, &a, SensorType::WaterLevel, 50.0, now - Duration::minutes(3)).await;
        record(&store, &b, SensorType::Vibration, 50.0, now).await;
        record(&store, &b, SensorType::Light, 50.0, now - Duration::minutes(2)).await;

        let Ok(all) = evaluator(&store).evaluate(None).await else {
            panic!("evaluation failed");
        };
        assert_eq!(all.len(), 5);

        let Ok(top) = evaluator(&store).evaluate(Some(2)).await else {
            panic!("evaluation failed");
        };
        let sensors: Vec<SensorType> = top.iter().map(|a| a.sensor_type).collect();
        assert_eq!(sensors, vec![SensorType::Vibration, SensorType::Humidity]);
    }

    #[tokio::test]
    async fn scan_depth_bounds_the_lookback() {
        let store = Arc::new(MemoryStore::new());
        let d = device(
            "D",
            DeviceType::Esp32Climate,
            ThresholdConfig::new(None, Some(10.0)),
        );
        store.insert_device(d.clone(), "k").await;
        let now = Utc::now();
        record(&store, &d, SensorType::WaterLevel, 99.0, now - Duration::minutes(30)).await;
        for i in 0..10 {
            record(&store, &d, SensorType::Temperature, 5.0, now - Duration::minutes(i)).await;
        }

        let Ok(alerts) = evaluator(&store).evaluate(None).await else {
            panic!("evaluation failed");
        };
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn boundary_values_do_not_fire() {
        let store = Arc::new(MemoryStore::new());
        let d = device(
            "D",
            DeviceType::Esp32Climate,
            ThresholdConfig::new(Some(20.0), Some(35.0)),
        );
        store.insert_device(d.clone(), "k").await;
        record(&store, &d, SensorType::Temperature, 35.0, Utc::now()).await;
        record(&store, &d, SensorType::Humidity, 20.0, Utc::now()).await;

        let Ok(alerts) = evaluator(&store).evaluate(None).await else {
            panic!("evaluation failed");
        };
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn limit_is_capped() {
        let store = Arc::new(MemoryStore::new());
        let d = device(
            "D",
            DeviceType::Esp32Climate,
            ThresholdConfig::new(None, Some(1.0)),
        );
        store.insert_device(d.clone(), "k").await;
        record(&store, &d, SensorType::Temperature, 5.0, Utc::now()).await;

        let dyn_store: Arc<dyn SensorStore> = Arc::clone(&store) as Arc<dyn SensorStore>;
        let evaluator = AlertEvaluator::new(
            dyn_store,
            EvaluatorLimits {
                scan_depth: 10,
                default_limit: 50,
                max_limit: 0,
            },
        );
        let Ok(alerts) = evaluator.evaluate(Some(100)).await else {
            panic!("evaluation failed");
        };
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn store_outage_fails_whole_evaluation() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);
        let result = evaluator(&store).evaluate(None).await;
        assert!(matches!(result, Err(GatewayError::PersistenceError(_))));
    }
}
