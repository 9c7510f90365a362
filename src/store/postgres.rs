//! PostgreSQL implementation of the store.
//!
//! Expects the tables owned by the device-management application:
//!
//! ```sql
//! devices (
//!     id            UUID PRIMARY KEY,
//!     device_id     TEXT UNIQUE NOT NULL,
//!     name          TEXT NOT NULL,
//!     location      TEXT,
//!     device_type   TEXT NOT NULL,            -- ESP32_1 | ESP32_2
//!     api_key       TEXT NOT NULL,
//!     threshold_min DOUBLE PRECISION,
//!     threshold_max DOUBLE PRECISION,
//!     is_active     BOOLEAN NOT NULL DEFAULT TRUE,
//!     updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
//! )
//! sensor_data (
//!     id          BIGSERIAL PRIMARY KEY,
//!     device_id   UUID NOT NULL REFERENCES devices(id),
//!     sensor_type TEXT NOT NULL,
//!     value       DOUBLE PRECISION NOT NULL,
//!     unit        TEXT NOT NULL,
//!     timestamp   TIMESTAMPTZ NOT NULL
//! )
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::SensorStore;
use super::models::{DeviceRecord, StoredReading};
use crate::config::GatewayConfig;
use crate::domain::{Reading, ThresholdConfig};
use crate::error::GatewayError;

type DeviceRow = (
    Uuid,
    String,
    String,
    Option<String>,
    String,
    Option<f64>,
    Option<f64>,
    bool,
);

type ReadingRow = (i64, Uuid, String, f64, String, DateTime<Utc>);

const DEVICE_COLUMNS: &str = "id, device_id, name, location, device_type, \
     threshold_min, threshold_max, is_active";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the database cannot be
    /// reached within the configured timeout.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

fn device_from_row(row: DeviceRow) -> Option<DeviceRecord> {
    let (id, device_id, name, location, device_type, min, max, is_active) = row;
    let Ok(device_type) = device_type.parse() else {
        tracing::warn!(%device_id, %device_type, "skipping device with unknown type");
        return None;
    };
    Some(DeviceRecord {
        id,
        device_id,
        name,
        location,
        device_type,
        thresholds: ThresholdConfig::new(min, max),
        is_active,
    })
}

fn reading_from_row(row: ReadingRow) -> Option<StoredReading> {
    let (id, device_pk, sensor_type, value, unit, timestamp) = row;
    let Ok(sensor_type) = sensor_type.parse() else {
        tracing::warn!(row_id = id, %sensor_type, "skipping reading with unknown sensor type");
        return None;
    };
    Some(StoredReading {
        id,
        device_pk,
        sensor_type,
        value,
        unit,
        timestamp,
    })
}

#[async_trait]
impl SensorStore for PostgresStore {
    async fn authenticate_device(
        &self,
        device_id: &str,
        api_key: &str,
    ) -> Result<Option<DeviceRecord>, GatewayError> {
        let row = sqlx::query_as::<_, DeviceRow>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices \
             WHERE device_id = $1 AND api_key = $2 AND is_active"
        ))
        .bind(device_id)
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(device_from_row))
    }

    async fn threshold_devices(&self) -> Result<Vec<DeviceRecord>, GatewayError> {
        let rows = sqlx::query_as::<_, DeviceRow>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices \
             WHERE is_active AND (threshold_min IS NOT NULL OR threshold_max IS NOT NULL)"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(device_from_row).collect())
    }

    async fn recent_readings(
        &self,
        device_pk: Uuid,
        limit: u32,
    ) -> Result<Vec<StoredReading>, GatewayError> {
        let rows = sqlx::query_as::<_, ReadingRow>(
            "SELECT id, device_id, sensor_type, value, unit, timestamp FROM sensor_data \
             WHERE device_id = $1 ORDER BY timestamp DESC, id DESC LIMIT $2",
        )
        .bind(device_pk)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(reading_from_row).collect())
    }

    async fn save_readings(
        &self,
        device_pk: Uuid,
        readings: &[Reading],
    ) -> Result<u64, GatewayError> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0_u64;
        for reading in readings {
            let result = sqlx::query(
                "INSERT INTO sensor_data (device_id, sensor_type, value, unit, timestamp) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(device_pk)
            .bind(reading.sensor_type.as_str())
            .bind(reading.value)
            .bind(&reading.unit)
            .bind(reading.timestamp)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }
        tx.commit().await?;
        Ok(written)
    }

    async fn touch_device(&self, device_pk: Uuid) -> Result<(), GatewayError> {
        sqlx::query("UPDATE devices SET updated_at = now() WHERE id = $1")
            .bind(device_pk)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
