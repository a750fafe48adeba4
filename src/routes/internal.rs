//! Internal endpoints for verifying and refreshing the runtime secret.
//!
//! Neither endpoint returns the secret value, only whether it is set and its
//! length in bytes.

use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;
use tracing::instrument;

use crate::error::{json_response, AppError};
use crate::secret;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub fake_secret_present: bool,
    pub fake_secret_len: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub status: &'static str,
    pub fake_secret_len: usize,
}

/// `GET /internal/config`
#[instrument(name = "internal::config_summary", skip(state))]
pub async fn config_summary(State(state): State<AppState>) -> Result<Response, AppError> {
    let secret = state.secret.get();
    tracing::debug!(
        present = secret.is_present(),
        fake_secret_len = secret.len(),
        "Reporting secret presence"
    );
    json_response(
        StatusCode::OK,
        &ConfigSummary {
            fake_secret_present: secret.is_present(),
            fake_secret_len: secret.len(),
        },
    )
}

/// `POST /-/reload`
///
/// Re-reads `<SECRET_FILE_DIR>/FAKE_SECRET` and publishes it. Concurrent
/// reloads are not serialized; the last one to finish wins.
#[instrument(name = "internal::reload", skip(state))]
pub async fn reload(State(state): State<AppState>) -> Result<Response, AppError> {
    let fake_secret_len = secret::reload(&state.secret, &state.secret_file_dir).await?;
    json_response(
        StatusCode::OK,
        &ReloadResponse {
            status: "ok",
            fake_secret_len,
        },
    )
}
