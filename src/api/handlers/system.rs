//! System endpoints: health check, sensor catalog.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::SensorTypeInfo;
use crate::app_state::AppState;
use crate::domain::CATALOG;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    connected_clients: usize,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp and the number of subscribed live connections.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            connected_clients: state.registry.connection_count().await,
        }),
    )
}

/// `GET /config/sensor-types`: List supported sensor types.
#[utoipa::path(
    get,
    path = "/config/sensor-types",
    tag = "System",
    summary = "List supported sensor types",
    description = "Returns label, default unit and severity cut points for every sensor type the gateway accepts.",
    responses(
        (status = 200, description = "Sensor catalog", body = Vec<SensorTypeInfo>),
    )
)]
pub async fn sensor_types_handler() -> impl IntoResponse {
    let types: Vec<SensorTypeInfo> = CATALOG.iter().map(SensorTypeInfo::from).collect();
    (StatusCode::OK, Json(types))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/sensor-types", get(sensor_types_handler))
}
