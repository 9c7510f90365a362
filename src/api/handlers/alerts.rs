//! Alert query endpoint handler.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{AlertListResponse, AlertQuery};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /alerts`: Current threshold violations.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] if the store cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    tag = "Alerts",
    summary = "List active alerts",
    description = "Checks the latest reading of every sensor on every threshold-configured device and returns the violations, newest first.",
    params(AlertQuery),
    responses(
        (status = 200, description = "Alert list", body = AlertListResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let alerts = state.alert_evaluator.evaluate(query.limit).await?;
    Ok((StatusCode::OK, Json(AlertListResponse::from(alerts))))
}

/// Alert routes (nested under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/alerts", get(list_alerts))
}
