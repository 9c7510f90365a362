//! Device ingest endpoint handler.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{IngestRequest, IngestResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /sensors/data`: Store and broadcast a device batch.
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed body, bad credentials, or a
/// store failure.
#[utoipa::path(
    post,
    path = "/api/v1/sensors/data",
    tag = "Ingest",
    summary = "Submit sensor readings",
    description = "Authenticates the device, stores the readings that fit its model, and pushes them to live subscribers. Also served at `/api/sensor-data`.",
    request_body = IngestRequest,
    responses(
        (status = 200, description = "Batch accepted", body = IngestResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 401, description = "Unknown device or invalid api key", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn ingest_sensor_data(
    State(state): State<AppState>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(req) = payload.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let (device_id, api_key, entries) = req.into_parts()?;

    let outcome = state
        .ingest_service
        .ingest(&device_id, &api_key, entries)
        .await?;

    Ok((StatusCode::OK, Json(IngestResponse::from(outcome))))
}

/// Ingest routes (nested under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/sensors/data", post(ingest_sensor_data))
}

/// Firmware-compatible ingest route mounted at the root level.
pub fn legacy_routes() -> Router<AppState> {
    Router::new().route("/api/sensor-data", post(ingest_sensor_data))
}
