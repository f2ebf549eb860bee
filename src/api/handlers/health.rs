use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub temp_dir: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // a missing object still proves the store is reachable
    let storage_status = if state.pipeline.storage().file_exists("health-check").await.is_ok() {
        "connected"
    } else {
        "disconnected"
    };

    let temp_status = if tokio::fs::metadata(state.pipeline.temp_dir())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        "ready"
    } else {
        "missing"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        storage: storage_status.to_string(),
        temp_dir: temp_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
