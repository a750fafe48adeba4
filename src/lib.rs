//! toy-service: a small HTTP service exposing health, echo, build metadata and
//! secret-presence endpoints, with runtime reload of a mounted secret.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod secret;
pub mod state;

pub use config::{AppConfig, ServiceConfig};
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
