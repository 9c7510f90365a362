//! WebSocket message types for the live-subscription channel.
//!
//! Client frames:
//! ```json
//! {"type": "subscribe",   "deviceId": "ESP32_DEMO_1", "sensorType": "TEMPERATURE"}
//! {"type": "unsubscribe", "deviceId": "ESP32_DEMO_1"}
//! ```
//! A missing, `null` or `"all"` sensor type means every sensor of the device.
//!
//! Server frames:
//! ```json
//! {"type": "sensor-data", "deviceId": "...", "sensorType": "...", "value": 1.0,
//!  "unit": "...", "timestamp": "..."}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{Reading, SensorClass, SensorType, SubscriptionKey};

/// Commands a client can send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Start receiving a stream.
    Subscribe(SubscriptionTarget),
    /// Stop receiving a stream.
    Unsubscribe(SubscriptionTarget),
}

/// Body of a subscribe/unsubscribe command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionTarget {
    /// Public device identifier.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Sensor type name; absent for the wildcard.
    #[serde(default)]
    pub sensor_type: Option<String>,
}

/// Why a client frame was ignored.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Frame was not a recognized command.
    #[error("malformed command: {0}")]
    Malformed(#[from] serde_json::Error),
    /// `deviceId` missing or blank.
    #[error("missing deviceId")]
    MissingDeviceId,
    /// `sensorType` names no known sensor.
    #[error("unknown sensor type: {0}")]
    UnknownSensorType(String),
}

impl SubscriptionTarget {
    /// Resolves the target into a registry key.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingDeviceId`] or
    /// [`CommandError::UnknownSensorType`].
    pub fn to_key(&self) -> Result<SubscriptionKey, CommandError> {
        let device_id = self
            .device_id
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(CommandError::MissingDeviceId)?;

        let class = match self.sensor_type.as_deref().map(str::trim) {
            None | Some("") => SensorClass::All,
            Some(s) if s.eq_ignore_ascii_case("all") => SensorClass::All,
            Some(s) => SensorClass::Sensor(
                s.parse::<SensorType>()
                    .map_err(|_| CommandError::UnknownSensorType(s.to_string()))?,
            ),
        };
        Ok(SubscriptionKey::new(device_id, class))
    }
}

/// Parses a text frame into a command.
///
/// # Errors
///
/// Returns [`CommandError::Malformed`] for invalid JSON or an unknown `type`.
pub fn parse_command(text: &str) -> Result<ClientCommand, CommandError> {
    Ok(serde_json::from_str(text)?)
}

/// Frames pushed to the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent<'a> {
    /// A live reading.
    #[serde(rename = "sensor-data")]
    SensorData(&'a Reading),
}
