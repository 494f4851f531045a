use axum::Json;

use crate::models::common::HealthResponse;

/// Handler for GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
