//! Service layer: business logic orchestration.
//!
//! [`IngestService`] drives the device → store → live-subscriber path.
//! [`AlertEvaluator`] answers alert queries from store snapshots.

pub mod alert_evaluator;
pub mod ingest_service;

pub use alert_evaluator::{Alert, AlertEvaluator, EvaluatorLimits};
pub use ingest_service::{IngestOutcome, IngestService, RawReading};
