//! Request ID middleware for correlating logs with requests.
//!
//! Each request gets an ID: the caller's `X-Request-Id` if it is usable,
//! otherwise a fresh UUID v4. A tracing span carrying the ID wraps the whole
//! request, and the ID is returned in the `X-Request-Id` response header.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use http::header::HeaderValue;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{MAX_REQUEST_ID_LEN, REQUEST_ID_HEADER};

/// Request ID, available to handlers through request extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Take the ID from an incoming header value, or generate one.
    fn from_header(value: Option<&HeaderValue>) -> Self {
        value
            .and_then(|v| v.to_str().ok())
            .filter(|v| is_valid_request_id(v))
            .map(|v| RequestId(v.to_string()))
            .unwrap_or_else(|| RequestId(Uuid::new_v4().to_string()))
    }
}

fn is_valid_request_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic())
}

/// Middleware that assigns a request ID and creates a request span.
///
/// This should be the outermost layer so the span covers CORS handling too.
pub async fn request_id_layer(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_header(request.headers().get(REQUEST_ID_HEADER));
    let span = tracing::info_span!(
        "request",
        request_id = %request_id.0,
        method = %request.method(),
        path = %request.uri().path(),
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();
    request.extensions_mut().insert(request_id.clone());

    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms,
            "Request completed"
        );

        // IDs are either generated or already validated as visible ASCII
        if let Ok(value) = HeaderValue::from_str(&request_id.0) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}
