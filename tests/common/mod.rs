//! Shared helpers for integration tests.

#![allow(dead_code, clippy::panic)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use sensor_gateway::app_state::AppState;
use sensor_gateway::config::GatewayConfig;
use sensor_gateway::domain::{DeviceType, ThresholdConfig};
use sensor_gateway::server::{build_app, build_state};
use sensor_gateway::store::{DeviceRecord, MemoryStore, SensorStore};

/// Public id of the seeded climate device.
pub const CLIMATE_DEVICE: &str = "ESP32_DEMO_1";
/// Public id of the seeded ground device.
pub const GROUND_DEVICE: &str = "ESP32_DEMO_2";
/// Api key shared by the seeded devices.
pub const API_KEY: &str = "esp32-test-key";

/// In-memory store with one device of each model, both bounded 20..35.
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (device_id, device_type, location) in [
        (CLIMATE_DEVICE, DeviceType::Esp32Climate, "Greenhouse A"),
        (GROUND_DEVICE, DeviceType::Esp32Ground, "Field 3"),
    ] {
        store
            .insert_device(
                DeviceRecord {
                    id: Uuid::new_v4(),
                    device_id: device_id.to_string(),
                    name: format!("{device_id} station"),
                    location: Some(location.to_string()),
                    device_type,
                    thresholds: ThresholdConfig::new(Some(20.0), Some(35.0)),
                    is_active: true,
                },
                API_KEY,
            )
            .await;
    }
    store
}

/// Builds the application and its state over `store` with default config.
pub fn test_app(store: &Arc<MemoryStore>) -> (Router, AppState) {
    let dyn_store: Arc<dyn SensorStore> = Arc::clone(store) as Arc<dyn SensorStore>;
    let state = build_state(dyn_store, &GatewayConfig::default());
    (build_app(state.clone()), state)
}

/// Sends a GET request and returns the status with the JSON body.
pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
        panic!("failed to build request");
    };
    send(app, request).await
}

/// Sends a POST request with a raw JSON body.
pub async fn post_raw(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let Ok(request) = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
    else {
        panic!("failed to build request");
    };
    send(app, request).await
}

/// Sends a POST request with a JSON value.
pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(app, uri, &body.to_string()).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router is infallible");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("failed to read body");
    };
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
