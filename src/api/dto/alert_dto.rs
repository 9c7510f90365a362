//! Alert and catalog DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{SensorProfile, SensorType};
use crate::service::Alert;

/// Query parameters for `GET /api/v1/alerts`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AlertQuery {
    /// Maximum number of alerts (server default and cap apply).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Response body for `GET /api/v1/alerts`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AlertListResponse {
    /// Alerts, newest first.
    pub alerts: Vec<Alert>,
    /// Number of alerts returned.
    pub total: usize,
}

impl From<Vec<Alert>> for AlertListResponse {
    fn from(alerts: Vec<Alert>) -> Self {
        Self {
            total: alerts.len(),
            alerts,
        }
    }
}

/// Severity cut points of one sensor type, in percent.
#[derive(Debug, Serialize, ToSchema)]
pub struct CutPointsInfo {
    /// Lower edge of MEDIUM.
    pub medium: f64,
    /// Lower edge of HIGH.
    pub high: f64,
    /// Lower edge of CRITICAL.
    pub critical: f64,
}

/// One row of the sensor catalog.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensorTypeInfo {
    /// Sensor type.
    pub sensor_type: SensorType,
    /// Display label.
    pub label: String,
    /// Default unit.
    pub unit: String,
    /// Severity cut points.
    pub cut_points: CutPointsInfo,
}

impl From<&SensorProfile> for SensorTypeInfo {
    fn from(profile: &SensorProfile) -> Self {
        Self {
            sensor_type: profile.sensor_type,
            label: profile.label.to_string(),
            unit: profile.unit.to_string(),
            cut_points: CutPointsInfo {
                medium: profile.cut_points.medium,
                high: profile.cut_points.high,
                critical: profile.cut_points.critical,
            },
        }
    }
}
