//! Store collaborator: device registry, thresholds, and reading history.
//!
//! Device registration, threshold editing and schema management happen
//! elsewhere. The gateway only needs the reads and writes on
//! [`SensorStore`]. [`PostgresStore`] is the production backend;
//! [`MemoryStore`] backs tests and persistence-disabled deployments.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Reading;
use crate::error::GatewayError;

pub use memory::MemoryStore;
pub use models::{DeviceRecord, StoredReading};
pub use postgres::PostgresStore;

/// Reads and writes the gateway performs against the device store.
#[async_trait]
pub trait SensorStore: Send + Sync + std::fmt::Debug {
    /// Returns the active device matching both `device_id` and `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the store is unreachable.
    async fn authenticate_device(
        &self,
        device_id: &str,
        api_key: &str,
    ) -> Result<Option<DeviceRecord>, GatewayError>;

    /// Returns every active device with at least one threshold bound.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the store is unreachable.
    async fn threshold_devices(&self) -> Result<Vec<DeviceRecord>, GatewayError>;

    /// Returns up to `limit` readings of a device, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the store is unreachable.
    async fn recent_readings(
        &self,
        device_pk: Uuid,
        limit: u32,
    ) -> Result<Vec<StoredReading>, GatewayError>;

    /// Persists readings for a device. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the write fails.
    async fn save_readings(&self, device_pk: Uuid, readings: &[Reading])
    -> Result<u64, GatewayError>;

    /// Records that a device was just heard from.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the write fails.
    async fn touch_device(&self, device_pk: Uuid) -> Result<(), GatewayError>;
}
