//! WebSocket layer: live sensor subscriptions.
//!
//! The endpoint at `/ws` accepts subscribe/unsubscribe commands and pushes
//! `sensor-data` frames for every matching reading.

pub mod connection;
pub mod handler;
pub mod messages;
