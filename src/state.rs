//! Shared application state for request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{AppConfig, ServiceConfig};
use crate::secret::SecretStore;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// The service metadata is fixed at startup. The secret store is the only
/// mutable part and is updated by the reload handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub secret: Arc<SecretStore>,
    pub secret_file_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(config: ServiceConfig, secret: SecretStore, secret_file_dir: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            secret: Arc::new(secret),
            secret_file_dir: Arc::new(secret_file_dir),
        }
    }

    /// Build state from the root configuration and an initial secret store.
    pub fn from_config(config: &AppConfig, secret: SecretStore) -> Self {
        Self::new(
            config.service.clone(),
            secret,
            config.secret_file_dir.clone(),
        )
    }
}
