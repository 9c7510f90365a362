//! Ingest service: authenticates a device batch, persists it, and hands it
//! to the broadcast dispatcher.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{BroadcastDispatcher, Reading, SensorType};
use crate::error::GatewayError;
use crate::store::{DeviceRecord, SensorStore};

/// One entry of a device batch before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    /// Sensor type name as sent by the device.
    pub sensor_type: String,
    /// Measured value.
    pub value: f64,
    /// Unit as sent by the device.
    pub unit: Option<String>,
    /// Sample time as sent by the device.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Result of one ingest call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Readings stored and broadcast.
    pub accepted: usize,
    /// Entries dropped as unknown, foreign to the device model, or non-finite.
    pub skipped: usize,
    /// Successful live deliveries.
    pub delivered: usize,
}

/// Orchestrates the ingest path: authenticate → normalize → persist →
/// broadcast.
#[derive(Debug, Clone)]
pub struct IngestService {
    store: Arc<dyn SensorStore>,
    dispatcher: BroadcastDispatcher,
}

impl IngestService {
    /// Creates a new `IngestService`.
    #[must_use]
    pub fn new(store: Arc<dyn SensorStore>, dispatcher: BroadcastDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Ingests a batch from one device.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidRequest`] if `device_id` or `api_key` is empty.
    /// - [`GatewayError::Unauthorized`] if the pair matches no active device.
    /// - [`GatewayError::PersistenceError`] if the store fails.
    pub async fn ingest(
        &self,
        device_id: &str,
        api_key: &str,
        entries: Vec<RawReading>,
    ) -> Result<IngestOutcome, GatewayError> {
        if device_id.trim().is_empty() || api_key.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "deviceId and apiKey are required".to_string(),
            ));
        }

        let device = self
            .store
            .authenticate_device(device_id, api_key)
            .await?
            .ok_or_else(|| {
                tracing::warn!(device_id, "rejected ingest: unknown device or bad api key");
                GatewayError::Unauthorized
            })?;

        let total = entries.len();
        let readings: Vec<Reading> = entries
            .into_iter()
            .filter_map(|entry| normalize(&device, entry))
            .collect();
        let skipped = total - readings.len();

        if !readings.is_empty() {
            self.store.save_readings(device.id, &readings).await?;
        }
        self.store.touch_device(device.id).await?;

        let report = self.dispatcher.ingest(&device.device_id, readings).await;

        tracing::info!(
            device_id = %device.device_id,
            accepted = report.readings,
            skipped,
            delivered = report.delivered,
            "readings ingested"
        );

        Ok(IngestOutcome {
            accepted: report.readings,
            skipped,
            delivered: report.delivered,
        })
    }
}

/// Validates one entry against the device and builds its [`Reading`].
fn normalize(device: &DeviceRecord, entry: RawReading) -> Option<Reading> {
    let Ok(sensor_type) = entry.sensor_type.parse::<SensorType>() else {
        tracing::debug!(device_id = %device.device_id, sensor_type = %entry.sensor_type, "unknown sensor type skipped");
        return None;
    };
    if !device.device_type.accepts(sensor_type) {
        tracing::debug!(
            device_id = %device.device_id,
            %sensor_type,
            device_type = device.device_type.as_str(),
            "sensor not fitted to device model, skipped"
        );
        return None;
    }
    if !entry.value.is_finite() {
        tracing::debug!(device_id = %device.device_id, %sensor_type, "non-finite value skipped");
        return None;
    }
    Some(Reading::new(
        device.device_id.clone(),
        sensor_type,
        entry.value,
        entry.unit,
        entry.timestamp,
    ))
}
