use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "generate3d-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: both collaborators must report healthy.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.pipeline.generator().health_check().await.map_err(|e| {
        tracing::warn!("Generator not ready: {}", e);
        AppError::ServiceUnavailable(format!("generator: {}", e))
    })?;

    state.pipeline.storage().health_check().await.map_err(|e| {
        tracing::warn!("Storage not ready: {}", e);
        AppError::ServiceUnavailable(format!("storage: {}", e))
    })?;

    Ok(StatusCode::OK)
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
