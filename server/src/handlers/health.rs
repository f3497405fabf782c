//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

/// Body returned by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process is serving.
    pub status: &'static str,
}

/// Report process liveness.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
