use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::database::DatabaseManager;

/// GET / - service identity
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Academic document archive API"
    }))
}

/// GET /health - liveness plus database reachability
pub async fn health_check() -> impl IntoResponse {
    match DatabaseManager::health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        ),
        Err(err) => {
            warn!("health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "database": "unavailable"
                })),
            )
        }
    }
}
