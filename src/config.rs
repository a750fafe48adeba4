//! Configuration loading and constants.
//!
//! All configuration comes from environment variables, resolved once at startup
//! into an `AppConfig`. Absent or empty variables fall back to fixed defaults, so
//! loading never fails. This module also defines the constants for request limits,
//! response headers, CORS, shutdown timing and logging.

use std::net::SocketAddr;
use std::path::PathBuf;

use const_format::formatcp;

// =============================================================================
// Environment Variable Names
// =============================================================================

pub const ENV_PORT: &str = "PORT";
pub const ENV_SERVICE_ENV: &str = "SERVICE_ENV";
pub const ENV_LOG_VERBOSITY: &str = "LOG_VERBOSITY";
pub const ENV_FAKE_SECRET: &str = "FAKE_SECRET";
pub const ENV_VERSION: &str = "VERSION";
pub const ENV_GIT_COMMIT: &str = "GIT_COMMIT";
pub const ENV_SECRET_FILE_DIR: &str = "SECRET_FILE_DIR";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_RUST_LOG: &str = "RUST_LOG";

// =============================================================================
// Service Metadata Defaults
// =============================================================================

pub const SERVICE_NAME: &str = "toy-service";
pub const DEFAULT_SERVICE_ENV: &str = "dev";
pub const DEFAULT_LOG_VERBOSITY: &str = "info";
pub const DEFAULT_VERSION: &str = "v0.3.26";
pub const DEFAULT_GIT_COMMIT: &str = "unknown";

// =============================================================================
// Listener and Shutdown
// =============================================================================

/// Port used when `PORT` is unset, empty or invalid
pub const DEFAULT_PORT: u16 = 8080;

/// Time allowed for in-flight requests to finish after a shutdown signal
pub const SHUTDOWN_GRACE_SECS: u64 = 5;

// =============================================================================
// Secret Reload
// =============================================================================

/// Mount point of the backend secret volume
pub const DEFAULT_SECRET_FILE_DIR: &str = "/etc/backend-secret";

/// File under the secret directory holding the runtime secret
pub const SECRET_FILE_NAME: &str = "FAKE_SECRET";

// =============================================================================
// Request Limits and Response Headers
// =============================================================================

/// Maximum accepted `/echo` body, in MiB
pub const MAX_ECHO_BODY_MIB: usize = 1;
pub const MAX_ECHO_BODY_BYTES: usize = MAX_ECHO_BODY_MIB << 20;

pub const PAYLOAD_TOO_LARGE_MESSAGE: &str =
    formatcp!("Payload too large (max {}MiB)", MAX_ECHO_BODY_MIB);

/// Environment-derived responses must not be cached by clients or proxies
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest incoming request ID that is propagated instead of replaced
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Preflight cache lifetime (5 minutes)
pub const CORS_MAX_AGE_SECS: u64 = 300;

// =============================================================================
// Logging
// =============================================================================

/// Default log filter when neither CLI, RUST_LOG nor LOG_VERBOSITY is set
pub const DEFAULT_LOG_FILTER: &str = "toy_service=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Immutable view of the service metadata reported by the handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub env: String,
    pub log_verbosity: String,
    pub version: String,
    pub git_commit: String,
    pub service_name: String,
}

impl ServiceConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            env: non_empty_or(&lookup, ENV_SERVICE_ENV, DEFAULT_SERVICE_ENV),
            log_verbosity: non_empty_or(&lookup, ENV_LOG_VERBOSITY, DEFAULT_LOG_VERBOSITY),
            version: non_empty_or(&lookup, ENV_VERSION, DEFAULT_VERSION),
            git_commit: non_empty_or(&lookup, ENV_GIT_COMMIT, DEFAULT_GIT_COMMIT),
            service_name: SERVICE_NAME.to_string(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable (default)
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse a format name, case-insensitively. Returns `None` for unknown names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Resolved `EnvFilter` directive string
    pub filter: String,
    pub format: LogFormat,
    /// Format name that was requested but not recognized, reported once logging is up
    pub unknown_format: Option<String>,
}

impl LoggingConfig {
    /// Resolve logging settings with priority: CLI > environment > default.
    ///
    /// For the filter, `RUST_LOG` wins over `LOG_VERBOSITY`, which is expanded
    /// to a per-crate directive.
    pub fn resolve<F>(cli_filter: Option<String>, cli_format: Option<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let filter = cli_filter
            .filter(|f| !f.trim().is_empty())
            .or_else(|| lookup(ENV_RUST_LOG).filter(|f| !f.trim().is_empty()))
            .or_else(|| {
                lookup(ENV_LOG_VERBOSITY)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("toy_service={v},tower_http={v}"))
            })
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let requested = cli_format
            .or_else(|| lookup(ENV_LOG_FORMAT))
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FORMAT.to_string());

        match LogFormat::parse(&requested) {
            Some(format) => Self {
                filter,
                format,
                unknown_format: None,
            },
            None => Self {
                filter,
                format: LogFormat::Text,
                unknown_format: Some(requested),
            },
        }
    }
}

/// Root configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service: ServiceConfig,
    /// Address the HTTP listener binds to
    pub listen_addr: SocketAddr,
    /// Directory containing the `FAKE_SECRET` file read on reload
    pub secret_file_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            service: ServiceConfig::from_lookup(&lookup),
            listen_addr: resolve_listen_addr(lookup(ENV_PORT).as_deref()),
            secret_file_dir: PathBuf::from(non_empty_or(
                &lookup,
                ENV_SECRET_FILE_DIR,
                DEFAULT_SECRET_FILE_DIR,
            )),
        }
    }
}

/// Resolve the listen address from a raw `PORT` value.
///
/// Accepts `"9090"` or `":9090"` with surrounding whitespace. Anything that is
/// not a valid `u16` port falls back to `DEFAULT_PORT` with a warning.
pub fn resolve_listen_addr(raw: Option<&str>) -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], resolve_port(raw)))
}

fn resolve_port(raw: Option<&str>) -> u16 {
    let Some(raw) = raw else {
        return DEFAULT_PORT;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_PORT;
    }

    let port = trimmed.strip_prefix(':').unwrap_or(trimmed);
    if port.is_empty() {
        tracing::warn!(
            default = DEFAULT_PORT,
            "PORT env var missing port number; using default"
        );
        return DEFAULT_PORT;
    }

    match port.parse::<u16>() {
        Ok(port) => port,
        Err(e) => {
            tracing::warn!(
                port = %raw,
                error = %e,
                default = DEFAULT_PORT,
                "Invalid PORT env var; using default"
            );
            DEFAULT_PORT
        }
    }
}

fn non_empty_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
