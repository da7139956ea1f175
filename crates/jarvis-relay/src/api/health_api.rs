use axum::Json;
use serde::Serialize;

use crate::prompts::ASSISTANT_NAME;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub assistant: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        assistant: ASSISTANT_NAME,
    })
}
