//! Ingest DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GatewayError;
use crate::service::{IngestOutcome, RawReading};

/// Request body for `POST /api/sensor-data` and `POST /api/v1/sensors/data`.
///
/// Every field is optional at the parser level so that a missing one
/// surfaces as a structured 400 rather than an extractor rejection.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    /// Public device identifier.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Device api key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Batch of readings, in sampling order.
    #[serde(default)]
    pub sensor_data: Option<Vec<SensorDataEntry>>,
}

/// One reading as sent by a device.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensorDataEntry {
    /// Sensor type name (e.g. `TEMPERATURE`).
    #[serde(default)]
    pub sensor_type: Option<String>,
    /// Measured value, as a number or a numeric string.
    #[serde(default)]
    pub value: Option<NumericValue>,
    /// Unit; the catalog default is used when absent.
    #[serde(default)]
    pub unit: Option<String>,
    /// Sample time (RFC 3339); arrival time is used when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A JSON number or a string holding one.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum NumericValue {
    /// Plain JSON number.
    Number(f64),
    /// Number encoded as a string.
    Text(String),
}

impl NumericValue {
    /// Numeric value, or NaN when the string does not parse.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

impl From<SensorDataEntry> for RawReading {
    fn from(entry: SensorDataEntry) -> Self {
        Self {
            sensor_type: entry.sensor_type.unwrap_or_default(),
            value: entry.value.as_ref().map_or(f64::NAN, NumericValue::to_f64),
            unit: entry.unit,
            timestamp: entry.timestamp,
        }
    }
}

impl IngestRequest {
    /// Splits the request into credentials and raw readings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if `deviceId`, `apiKey` or
    /// `sensorData` is missing.
    pub fn into_parts(self) -> Result<(String, String, Vec<RawReading>), GatewayError> {
        match (self.device_id, self.api_key, self.sensor_data) {
            (Some(device_id), Some(api_key), Some(entries)) => Ok((
                device_id,
                api_key,
                entries.into_iter().map(RawReading::from).collect(),
            )),
            _ => Err(GatewayError::InvalidRequest(
                "deviceId, apiKey and sensorData are required".to_string(),
            )),
        }
    }
}

/// Response body for a successful ingest.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    /// Human-readable status.
    pub message: String,
    /// Readings stored and broadcast.
    pub data_count: usize,
    /// Live deliveries made to subscribers.
    pub delivered: usize,
}

impl From<IngestOutcome> for IngestResponse {
    fn from(outcome: IngestOutcome) -> Self {
        Self {
            message: "Sensor data saved successfully".to_string(),
            data_count: outcome.accepted,
            delivered: outcome.delivered,
        }
    }
}
