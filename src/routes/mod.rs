//! HTTP route handlers.
//!
//! Routes are matched on exact method and path. Environment-derived metadata is
//! served with `Cache-Control: no-store`; the echo route carries its own body
//! limit. CORS applies to every route, and the request ID middleware wraps
//! everything so each request is logged under one span.

pub mod echo;
pub mod health;
pub mod info;
pub mod internal;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderName, HeaderValue, CACHE_CONTROL};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_NO_STORE, CORS_MAX_AGE_SECS, MAX_ECHO_BODY_BYTES, REQUEST_ID_HEADER};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// CORS policy: any origin and request header, no credentials, the request ID
/// exposed to scripts, preflight cached for five minutes.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::HEAD])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(false)
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECS))
}

/// Creates the Axum router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Metadata - never cached, reflects the environment of this process
    let metadata_routes = Router::new()
        .route("/info", get(info::info))
        .route("/version", get(info::version))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ));

    // Echo - bounded request body
    let echo_routes = Router::new()
        .route("/echo", post(echo::echo))
        .layer(DefaultBodyLimit::max(MAX_ECHO_BODY_BYTES));

    // Secret presence and reload
    let internal_routes = Router::new()
        .route("/internal/config", get(internal::config_summary))
        .route("/-/reload", post(internal::reload));

    // Health check - liveness probe
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    Router::new()
        .merge(metadata_routes)
        .merge(echo_routes)
        .merge(internal_routes)
        .merge(health_routes)
        .with_state(state)
        .layer(cors_layer())
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
