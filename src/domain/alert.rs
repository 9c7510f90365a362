//! Threshold violation classification.
//!
//! Pure functions: given a device's bounds and one reading, decide whether
//! the reading violates a bound and how severe the excursion is.
//!
//! Severity is the percentage by which the value overshoots the violated
//! bound, relative to the bound itself, mapped onto the sensor's cut points
//! from the catalog. A bound of exactly zero has no scale to measure a
//! percentage against, so that side is not alerted on.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SensorType;

/// Per-device alerting bounds. Both absent means the device never alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
    /// Values strictly below this raise a LOW alert.
    pub min: Option<f64>,
    /// Values strictly above this raise a HIGH alert.
    pub max: Option<f64>,
}

impl ThresholdConfig {
    /// Creates a threshold configuration.
    #[must_use]
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Returns `true` if at least one bound is set.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// Which bound a reading crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Below the minimum.
    Low,
    /// Above the maximum.
    High,
}

/// Operator-facing urgency tier, ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Marginal excursion.
    Low,
    /// Noticeable excursion.
    Medium,
    /// Large excursion.
    High,
    /// Act now.
    Critical,
}

/// A classified bound violation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    /// Bound that was crossed.
    pub alert_type: AlertType,
    /// Percent overshoot relative to the crossed bound.
    pub deviation_pct: f64,
    /// Tier derived from `deviation_pct`.
    pub severity: Severity,
}

/// Percent by which `value` lies beyond `bound`, relative to `bound`.
/// `None` for a zero bound.
///
/// A negative bound flips the sign, so the result can be negative and
/// then falls in the lowest tier.
#[must_use]
pub fn deviation_pct(alert_type: AlertType, value: f64, bound: f64) -> Option<f64> {
    if bound == 0.0 {
        return None;
    }
    let overshoot = match alert_type {
        AlertType::Low => bound - value,
        AlertType::High => value - bound,
    };
    Some(overshoot / bound * 100.0)
}

/// Classifies one reading against a device's bounds.
///
/// Strict inequalities only: a value equal to a bound is in range. A
/// reading yields at most one violation. If a misconfigured device has
/// `min > max` and the value is outside both, HIGH is reported.
#[must_use]
pub fn classify(sensor: SensorType, value: f64, thresholds: &ThresholdConfig) -> Option<Violation> {
    [
        (AlertType::High, thresholds.max),
        (AlertType::Low, thresholds.min),
    ]
    .into_iter()
    .find_map(|(alert_type, bound)| {
        let bound = bound?;
        let outside = match alert_type {
            AlertType::Low => value < bound,
            AlertType::High => value > bound,
        };
        if !outside {
            return None;
        }
        let Some(deviation_pct) = deviation_pct(alert_type, value, bound) else {
            tracing::debug!(%sensor, ?alert_type, value, "zero bound, violation not scored");
            return None;
        };
        Some(Violation {
            alert_type,
            deviation_pct,
            severity: sensor.profile().cut_points.tier(deviation_pct),
        })
    })
}
