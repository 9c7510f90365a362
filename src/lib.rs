//! # sensor-gateway
//!
//! Ingest, live broadcast and threshold alerting for remote field sensors.
//!
//! Devices post batches of readings over HTTP. Each accepted reading is
//! stored and pushed to every WebSocket viewer subscribed to that device
//! (one sensor or all of them). Alerts are computed on demand from the
//! latest stored reading of each sensor against the device's bounds.
//!
//! ## Architecture
//!
//! ```text
//! Devices (HTTP)          Viewers (WebSocket)
//!     │                         │
//!     ├── REST Handlers (api/)  ├── WS Handler (ws/)
//!     │                         │
//!     ├── IngestService ──► BroadcastDispatcher ──► SubscriptionRegistry
//!     ├── AlertEvaluator (service/)
//!     │
//!     └── SensorStore (store/): PostgreSQL or in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod store;
pub mod ws;
