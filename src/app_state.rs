//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::SubscriptionRegistry;
use crate::service::{AlertEvaluator, IngestService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Device ingest path.
    pub ingest_service: Arc<IngestService>,
    /// On-demand alert computation.
    pub alert_evaluator: Arc<AlertEvaluator>,
    /// Live subscriptions, shared with the dispatcher inside `ingest_service`.
    pub registry: Arc<SubscriptionRegistry>,
    /// Outbound queue capacity for each new WebSocket connection.
    pub connection_buffer: usize,
}
