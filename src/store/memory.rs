//! In-memory store.
//!
//! Used when persistence is disabled and throughout the test suite. The
//! store can be switched offline to simulate an unreachable database.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::SensorStore;
use super::models::{DeviceRecord, StoredReading};
use crate::domain::Reading;
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct MemoryState {
    devices: HashMap<Uuid, (DeviceRecord, String)>,
    readings: HashMap<Uuid, VecDeque<StoredReading>>,
    last_seen: HashMap<Uuid, DateTime<Utc>>,
    next_row_id: i64,
}

impl MemoryState {
    fn push_reading(&mut self, device_pk: Uuid, reading: &Reading, retention: usize) {
        self.next_row_id += 1;
        let rows = self.readings.entry(device_pk).or_default();
        rows.push_back(StoredReading {
            id: self.next_row_id,
            device_pk,
            sensor_type: reading.sensor_type,
            value: reading.value,
            unit: reading.unit.clone(),
            timestamp: reading.timestamp,
        });
        while rows.len() > retention {
            rows.pop_front();
        }
    }
}

/// Readings kept per device when no retention is given.
pub const DEFAULT_RETENTION: usize = 1_000;

/// Store held entirely in process memory.
///
/// Keeps at most `retention` readings per device, dropping the oldest
/// inserted first.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    offline: AtomicBool,
    retention: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }
}

impl MemoryStore {
    /// Creates an empty store with [`DEFAULT_RETENTION`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store keeping `retention` readings per device.
    #[must_use]
    pub fn with_retention(retention: usize) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            offline: AtomicBool::new(false),
            retention: retention.max(1),
        }
    }

    /// Registers a device with its api key, replacing any device with the
    /// same primary key.
    pub async fn insert_device(&self, device: DeviceRecord, api_key: impl Into<String>) {
        self.state
            .write()
            .await
            .devices
            .insert(device.id, (device, api_key.into()));
    }

    /// Appends a historical reading for a device.
    pub async fn insert_reading(&self, device_pk: Uuid, reading: &Reading) {
        self.state
            .write()
            .await
            .push_reading(device_pk, reading, self.retention);
    }

    /// Number of stored readings for a device.
    pub async fn reading_count(&self, device_pk: Uuid) -> usize {
        self.state
            .read()
            .await
            .readings
            .get(&device_pk)
            .map_or(0, VecDeque::len)
    }

    /// When the device was last heard from.
    pub async fn last_seen(&self, device_pk: Uuid) -> Option<DateTime<Utc>> {
        self.state.read().await.last_seen.get(&device_pk).copied()
    }

    /// Makes every store call fail until switched back on.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::PersistenceError(
                "store unreachable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SensorStore for MemoryStore {
    async fn authenticate_device(
        &self,
        device_id: &str,
        api_key: &str,
    ) -> Result<Option<DeviceRecord>, GatewayError> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(state
            .devices
            .values()
            .find(|(d, key)| d.is_active && d.device_id == device_id && key == api_key)
            .map(|(d, _)| d.clone()))
    }

    async fn threshold_devices(&self) -> Result<Vec<DeviceRecord>, GatewayError> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(state
            .devices
            .values()
            .map(|(d, _)| d)
            .filter(|d| d.is_active && d.thresholds.is_configured())
            .cloned()
            .collect())
    }

    async fn recent_readings(
        &self,
        device_pk: Uuid,
        limit: u32,
    ) -> Result<Vec<StoredReading>, GatewayError> {
        self.check_online()?;
        let state = self.state.read().await;
        let mut rows: Vec<StoredReading> = state
            .readings
            .get(&device_pk)
            .map(|rows| rows.iter().cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn save_readings(
        &self,
        device_pk: Uuid,
        readings: &[Reading],
    ) -> Result<u64, GatewayError> {
        self.check_online()?;
        let mut state = self.state.write().await;
        for reading in readings {
            state.push_reading(device_pk, reading, self.retention);
        }
        Ok(readings.len() as u64)
    }

    async fn touch_device(&self, device_pk: Uuid) -> Result<(), GatewayError> {
        self.check_online()?;
        self.state
            .write()
            .await
            .last_seen
            .insert(device_pk, Utc::now());
        Ok(())
    }
}
