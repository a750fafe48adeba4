//! Echo endpoint.
//!
//! Returns the caller's message with ` [modified]` appended, together with the
//! build metadata of the running service. Bodies are capped at
//! `MAX_ECHO_BODY_BYTES` and must be a JSON object with exactly one non-empty
//! `message` field.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{json_response, AppError};
use crate::state::AppState;

pub const ECHO_SUFFIX: &str = " [modified]";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EchoRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct EchoResponse {
    pub message: String,
    pub version: String,
    pub commit: String,
    pub env: String,
}

/// Parse and validate an echo request body.
pub fn parse_echo_request(body: &[u8]) -> Result<EchoRequest, AppError> {
    let request: EchoRequest =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidInput(e.to_string()))?;
    if request.message.is_empty() {
        return Err(AppError::InvalidInput("message is empty".to_string()));
    }
    Ok(request)
}

/// `POST /echo`
#[instrument(name = "echo::echo", skip(state, body))]
pub async fn echo(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::InvalidInput(rejection.body_text())
        }
    })?;

    let request = parse_echo_request(&body)?;
    let config = &state.config;
    let response = EchoResponse {
        message: format!("{}{}", request.message, ECHO_SUFFIX),
        version: config.version.clone(),
        commit: config.git_commit.clone(),
        env: config.env.clone(),
    };

    tracing::debug!(message_len = request.message.len(), "Echoing message");
    json_response(StatusCode::OK, &response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_request() {
        let request = parse_echo_request(br#"{"message":"Hello"}"#).unwrap();
        assert_eq!(request.message, "Hello");
    }

    #[test]
    fn test_parse_rejects_bad_bodies() {
        let bodies: &[&[u8]] = &[
            br#"{"message":""}"#,
            br#"{}"#,
            br#"{"msg":"NoMessageField"}"#,
            br#"{"message":"hi","extra":true}"#,
            br#"{"message":42}"#,
            br#"{"message":"#,
            b"",
            b"not json",
        ];
        for body in bodies {
            let err = parse_echo_request(body).unwrap_err();
            assert!(
                matches!(err, AppError::InvalidInput(_)),
                "body {:?} should be invalid",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_parse_keeps_unicode_message() {
        let request = parse_echo_request(r#"{"message":"héllo 🌍"}"#.as_bytes()).unwrap();
        assert_eq!(request.message, "héllo 🌍");
    }
}
