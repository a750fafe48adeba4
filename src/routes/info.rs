//! Service metadata endpoints.
//!
//! `/info` reports the runtime configuration, including whether the secret is
//! set and how long it is, but never the secret itself. `/version` is the short
//! build-only form. Both are served with `Cache-Control: no-store` (see
//! `create_router`).

use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;
use tracing::instrument;

use crate::error::{json_response, AppError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub env: String,
    pub log_verbosity: String,
    pub fake_secret_present: bool,
    /// Only reported when the secret is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fake_secret_length: Option<usize>,
    pub commit: String,
}

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub name: String,
    pub version: String,
    pub commit: String,
}

/// `GET /info`
#[instrument(name = "info::info", skip(state))]
pub async fn info(State(state): State<AppState>) -> Result<Response, AppError> {
    let config = &state.config;
    let secret = state.secret.get();

    let response = InfoResponse {
        name: config.service_name.clone(),
        version: config.version.clone(),
        env: config.env.clone(),
        log_verbosity: config.log_verbosity.clone(),
        fake_secret_present: secret.is_present(),
        fake_secret_length: secret.is_present().then(|| secret.len()),
        commit: config.git_commit.clone(),
    };
    json_response(StatusCode::OK, &response)
}

/// `GET /version`
#[instrument(name = "info::version", skip(state))]
pub async fn version(State(state): State<AppState>) -> Result<Response, AppError> {
    let config = &state.config;
    json_response(
        StatusCode::OK,
        &VersionInfo {
            name: config.service_name.clone(),
            version: config.version.clone(),
            commit: config.git_commit.clone(),
        },
    )
}
