//! Health check handler.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub(crate) struct HealthCheckResponse {
    pub status: String,
    pub media_store: String,
    pub backend: String,
}

/// Reads a key that never exists from the media store. A clean miss means
/// the store is reachable.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let check = state.media_store.get("health", "ping");
    let media_store = match tokio::time::timeout(CHECK_TIMEOUT, check).await {
        Ok(Ok(_)) => "healthy".to_string(),
        Ok(Err(e)) if e.is_not_found() => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Media store health check failed");
            format!("unhealthy: {}", e)
        }
        Err(_) => {
            tracing::error!("Media store health check timed out");
            "timeout".to_string()
        }
    };

    let healthy = media_store == "healthy";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthCheckResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            media_store,
            backend: state.media_store.backend_type().to_string(),
        }),
    )
}
