//! Normalized sensor reading.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::SensorType;

/// One sample from one sensor of one device.
///
/// Immutable once built. This is the exact payload pushed to live
/// subscribers as a `sensor-data` event.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Public device identifier (the one devices authenticate with).
    pub device_id: String,
    /// Sensor that produced the value.
    pub sensor_type: SensorType,
    /// Measured value.
    pub value: f64,
    /// Measurement unit.
    pub unit: String,
    /// Sample time; arrival time when the device did not send one.
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Builds a reading, defaulting the unit from the sensor catalog and
    /// the timestamp to now.
    #[must_use]
    pub fn new(
        device_id: impl Into<String>,
        sensor_type: SensorType,
        value: f64,
        unit: Option<String>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        let unit = unit
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| sensor_type.profile().unit.to_string());
        Self {
            device_id: device_id.into(),
            sensor_type,
            value,
            unit,
            timestamp: timestamp.unwrap_or_else(Utc::now),
        }
    }
}
