//! Handler-boundary errors.
//!
//! Every failure a handler can hit is turned into a JSON envelope
//! `{"error": "<message>"}` with a fixed, client-safe message. The underlying
//! cause is logged, never sent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

use crate::config::PAYLOAD_TOO_LARGE_MESSAGE;
use crate::secret::{ReloadError, SecretError};

pub const INVALID_INPUT_MESSAGE: &str = "Invalid input";
pub const SECRET_READ_MESSAGE: &str = "failed to read secret file";
pub const SECRET_UPDATE_MESSAGE: &str = "failed setting env";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Failed to read secret file {}: {source}", .path.display())]
    SecretRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to update secret: {0}")]
    SecretUpdate(#[from] SecretError),

    #[error("Failed to encode response: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<ReloadError> for AppError {
    fn from(err: ReloadError) -> Self {
        match err {
            ReloadError::Read { path, source } => AppError::SecretRead { path, source },
            ReloadError::Update(e) => AppError::SecretUpdate(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::SecretRead { .. }
            | AppError::SecretUpdate(_)
            | AppError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => INVALID_INPUT_MESSAGE,
            AppError::PayloadTooLarge => PAYLOAD_TOO_LARGE_MESSAGE,
            AppError::SecretRead { .. } => SECRET_READ_MESSAGE,
            AppError::SecretUpdate(_) => SECRET_UPDATE_MESSAGE,
            AppError::Encoding(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::InvalidInput(_) => tracing::debug!(error = %self, "Rejected request"),
            AppError::PayloadTooLarge => tracing::warn!("Rejected request: payload too large"),
            _ => tracing::error!(error = ?self, "Request failed"),
        }

        let body = serde_json::json!({ "error": self.public_message() }).to_string();
        (
            status,
            [(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))],
            body,
        )
            .into_response()
    }
}

/// Serialize `body` as a JSON response with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response, AppError> {
    let bytes = serde_json::to_vec(body)?;
    Ok((
        status,
        [(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot encode"))
        }
    }

    #[tokio::test]
    async fn test_invalid_input_envelope() {
        let response = AppError::InvalidInput("missing field".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Invalid input" })
        );
    }

    #[tokio::test]
    async fn test_payload_too_large_envelope() {
        let response = AppError::PayloadTooLarge.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await["error"],
            "Payload too large (max 1MiB)"
        );
    }

    #[tokio::test]
    async fn test_secret_read_hides_io_detail() {
        let err = AppError::SecretRead {
            path: PathBuf::from("/etc/backend-secret/FAKE_SECRET"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "failed to read secret file" }));
    }

    #[test]
    fn test_reload_error_mapping() {
        let err: AppError = ReloadError::Update(SecretError::ContainsNul).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "failed setting env");
    }

    #[tokio::test]
    async fn test_encoding_failure_is_internal_error() {
        let err = json_response(StatusCode::OK, &Unencodable).unwrap_err();
        assert!(matches!(err, AppError::Encoding(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal Server Error");
    }

    #[tokio::test]
    async fn test_json_response_sets_content_type() {
        let response =
            json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" })).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_json(response).await["status"], "ok");
    }
}
