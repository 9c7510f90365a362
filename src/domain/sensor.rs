//! Sensor catalog: the closed set of sensor types and device models.
//!
//! Unit, label, and severity cut points for every sensor type live in one
//! lookup table ([`CATALOG`]) instead of being scattered across branches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::alert::Severity;

/// Physical quantity measured by a field sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorType {
    /// Air temperature.
    Temperature,
    /// Relative air humidity.
    Humidity,
    /// Water level of a tank, canal or river.
    WaterLevel,
    /// Ground or structure vibration.
    Vibration,
    /// Volumetric soil moisture.
    SoilMoisture,
    /// Ambient light intensity.
    Light,
}

impl SensorType {
    /// Every sensor type, in catalog order.
    pub const ALL: [Self; 6] = [
        Self::Temperature,
        Self::Humidity,
        Self::WaterLevel,
        Self::Vibration,
        Self::SoilMoisture,
        Self::Light,
    ];

    /// Wire name (e.g. `"WATER_LEVEL"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "TEMPERATURE",
            Self::Humidity => "HUMIDITY",
            Self::WaterLevel => "WATER_LEVEL",
            Self::Vibration => "VIBRATION",
            Self::SoilMoisture => "SOIL_MOISTURE",
            Self::Light => "LIGHT",
        }
    }

    /// Catalog entry for this sensor type.
    #[must_use]
    pub const fn profile(self) -> &'static SensorProfile {
        match self {
            Self::Temperature => &TEMPERATURE,
            Self::Humidity => &HUMIDITY,
            Self::WaterLevel => &WATER_LEVEL,
            Self::Vibration => &VIBRATION,
            Self::SoilMoisture => &SOIL_MOISTURE,
            Self::Light => &LIGHT,
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known sensor type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sensor type: {0}")]
pub struct UnknownSensorType(pub String);

impl FromStr for SensorType {
    type Err = UnknownSensorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSensorType(s.to_string()))
    }
}

/// Deviation percentages above which a violation escalates a tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPoints {
    /// Deviation strictly above this is at least MEDIUM.
    pub medium: f64,
    /// Deviation strictly above this is at least HIGH.
    pub high: f64,
    /// Deviation strictly above this is CRITICAL.
    pub critical: f64,
}

impl CutPoints {
    /// Maps a deviation percentage onto a severity tier.
    #[must_use]
    pub fn tier(&self, deviation_pct: f64) -> Severity {
        if deviation_pct > self.critical {
            Severity::Critical
        } else if deviation_pct > self.high {
            Severity::High
        } else if deviation_pct > self.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Display and alerting metadata for one sensor type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorProfile {
    /// Sensor type this row describes.
    pub sensor_type: SensorType,
    /// Human-readable label.
    pub label: &'static str,
    /// Unit assumed when a device omits one.
    pub unit: &'static str,
    /// Severity cut points (percent deviation past the violated bound).
    pub cut_points: CutPoints,
}

// Structural hazards escalate earliest, temperature next, the rest last.
const HAZARD_CUTS: CutPoints = CutPoints {
    medium: 15.0,
    high: 30.0,
    critical: 50.0,
};
const TEMPERATURE_CUTS: CutPoints = CutPoints {
    medium: 10.0,
    high: 25.0,
    critical: 40.0,
};
const DEFAULT_CUTS: CutPoints = CutPoints {
    medium: 20.0,
    high: 40.0,
    critical: 60.0,
};

const TEMPERATURE: SensorProfile = SensorProfile {
    sensor_type: SensorType::Temperature,
    label: "Temperature",
    unit: "°C",
    cut_points: TEMPERATURE_CUTS,
};
const HUMIDITY: SensorProfile = SensorProfile {
    sensor_type: SensorType::Humidity,
    label: "Air Humidity",
    unit: "%",
    cut_points: DEFAULT_CUTS,
};
const WATER_LEVEL: SensorProfile = SensorProfile {
    sensor_type: SensorType::WaterLevel,
    label: "Water Level",
    unit: "cm",
    cut_points: HAZARD_CUTS,
};
const VIBRATION: SensorProfile = SensorProfile {
    sensor_type: SensorType::Vibration,
    label: "Vibration",
    unit: "g",
    cut_points: HAZARD_CUTS,
};
const SOIL_MOISTURE: SensorProfile = SensorProfile {
    sensor_type: SensorType::SoilMoisture,
    label: "Soil Moisture",
    unit: "%",
    cut_points: DEFAULT_CUTS,
};
const LIGHT: SensorProfile = SensorProfile {
    sensor_type: SensorType::Light,
    label: "Light Intensity",
    unit: "lux",
    cut_points: DEFAULT_CUTS,
};

/// The full sensor lookup table.
pub const CATALOG: [SensorProfile; 6] =
    [TEMPERATURE, HUMIDITY, WATER_LEVEL, VIBRATION, SOIL_MOISTURE, LIGHT];

/// Hardware model of a field device. Each model carries a fixed sensor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum DeviceType {
    /// Temperature, humidity and water-level node.
    #[serde(rename = "ESP32_1")]
    Esp32Climate,
    /// Vibration, soil-moisture and light node.
    #[serde(rename = "ESP32_2")]
    Esp32Ground,
}

impl DeviceType {
    /// Sensors physically present on this device model.
    #[must_use]
    pub const fn sensors(self) -> &'static [SensorType] {
        match self {
            Self::Esp32Climate => &[
                SensorType::Temperature,
                SensorType::Humidity,
                SensorType::WaterLevel,
            ],
            Self::Esp32Ground => &[
                SensorType::Vibration,
                SensorType::SoilMoisture,
                SensorType::Light,
            ],
        }
    }

    /// Returns `true` if readings of `sensor` may come from this model.
    #[must_use]
    pub fn accepts(self, sensor: SensorType) -> bool {
        self.sensors().contains(&sensor)
    }

    /// Wire name (e.g. `"ESP32_1"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Esp32Climate => "ESP32_1",
            Self::Esp32Ground => "ESP32_2",
        }
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ESP32_1" => Ok(Self::Esp32Climate),
            "ESP32_2" => Ok(Self::Esp32Ground),
            other => Err(format!("unknown device type: {other}")),
        }
    }
}
