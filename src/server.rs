//! Application assembly: wires stores, services and routes into one router.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::domain::{BroadcastDispatcher, SubscriptionRegistry};
use crate::service::{AlertEvaluator, EvaluatorLimits, IngestService};
use crate::store::SensorStore;
use crate::ws::handler::ws_handler;

/// Builds the shared state over `store` using the limits in `config`.
#[must_use]
pub fn build_state(store: Arc<dyn SensorStore>, config: &GatewayConfig) -> AppState {
    let registry = Arc::new(SubscriptionRegistry::new());
    let dispatcher = BroadcastDispatcher::new(Arc::clone(&registry));

    let ingest_service = Arc::new(IngestService::new(Arc::clone(&store), dispatcher));
    let alert_evaluator = Arc::new(AlertEvaluator::new(
        store,
        EvaluatorLimits {
            scan_depth: config.alert_scan_depth,
            default_limit: config.alert_default_limit,
            max_limit: config.alert_max_limit,
        },
    ));

    AppState {
        ingest_service,
        alert_evaluator,
        registry,
        connection_buffer: config.connection_buffer,
    }
}

/// Builds the full HTTP application: REST routes, `/ws`, tracing and CORS.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
