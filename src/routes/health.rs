//! Health check endpoint for container orchestration.
//!
//! Liveness probe only: it reports `ok` whenever the process can answer HTTP,
//! independent of configuration or secret state.

use axum::{http::StatusCode, response::Response};
use serde::Serialize;
use tracing::instrument;

use crate::error::{json_response, AppError};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// `GET /healthz`
#[instrument(name = "health::healthz")]
pub async fn healthz() -> Result<Response, AppError> {
    json_response(StatusCode::OK, &HealthStatus { status: "ok" })
}
