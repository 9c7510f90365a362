//! Records exchanged with the device/reading store.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{DeviceType, SensorType, ThresholdConfig};

/// A registered field device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    /// Store primary key.
    pub id: Uuid,
    /// Public identifier the device authenticates with.
    pub device_id: String,
    /// Display name.
    pub name: String,
    /// Free-form installation site.
    pub location: Option<String>,
    /// Hardware model.
    pub device_type: DeviceType,
    /// Alerting bounds.
    pub thresholds: ThresholdConfig,
    /// Inactive devices neither ingest nor alert.
    pub is_active: bool,
}

/// A persisted reading row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReading {
    /// Auto-increment row ID.
    pub id: i64,
    /// Owning device primary key.
    pub device_pk: Uuid,
    /// Sensor that produced the value.
    pub sensor_type: SensorType,
    /// Measured value.
    pub value: f64,
    /// Measurement unit.
    pub unit: String,
    /// Sample time.
    pub timestamp: DateTime<Utc>,
}
