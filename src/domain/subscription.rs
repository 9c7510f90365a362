//! Subscription keys: `(device, sensor class)` pairs.

use std::fmt;

use super::SensorType;

/// Which sensors of a device a subscription covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorClass {
    /// Exactly one sensor type.
    Sensor(SensorType),
    /// Every sensor of the device.
    All,
}

impl SensorClass {
    /// Wire form: the sensor type name, or `"all"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sensor(t) => t.as_str(),
            Self::All => "all",
        }
    }
}

impl From<Option<SensorType>> for SensorClass {
    fn from(sensor: Option<SensorType>) -> Self {
        sensor.map_or(Self::All, Self::Sensor)
    }
}

impl fmt::Display for SensorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `deviceId:sensorClass` interest held by a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    /// Public device identifier.
    pub device_id: String,
    /// Sensor type, or the wildcard.
    pub class: SensorClass,
}

impl SubscriptionKey {
    /// Creates a key.
    #[must_use]
    pub fn new(device_id: impl Into<String>, class: SensorClass) -> Self {
        Self {
            device_id: device_id.into(),
            class,
        }
    }

    /// Wildcard key for every sensor of `device_id`.
    #[must_use]
    pub fn all(device_id: impl Into<String>) -> Self {
        Self::new(device_id, SensorClass::All)
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device_id, self.class)
    }
}
