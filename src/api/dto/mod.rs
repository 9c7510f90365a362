//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire, matching the device firmware and
//! the dashboard.

pub mod alert_dto;
pub mod ingest_dto;

pub use alert_dto::*;
pub use ingest_dto::*;
