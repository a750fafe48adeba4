//! Signal handling.
//!
//! Handles:
//! - SIGTERM/SIGINT: Graceful shutdown with connection draining
//! - SIGHUP: Runtime secret reload (Unix only)

use crate::secret;
use crate::state::AppState;

/// Resolves when SIGINT (Ctrl+C) or SIGTERM is received.
///
/// If a handler cannot be installed the error is logged and that signal is
/// never observed; the other one still works.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

/// Setup SIGHUP handler for secret reload.
///
/// When SIGHUP is received the secret file is read again, exactly as
/// `POST /-/reload` does. A failed reload keeps the current value.
#[cfg(unix)]
pub fn setup_reload_handler(state: AppState) {
    tokio::spawn(async move {
        let mut sighup =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup()) {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGHUP handler");
                    return;
                }
            };

        while sighup.recv().await.is_some() {
            tracing::info!("Received SIGHUP, reloading secret");

            match secret::reload(&state.secret, &state.secret_file_dir).await {
                Ok(len) => {
                    tracing::info!(fake_secret_len = len, "Secret reloaded");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to reload secret, keeping current value");
                }
            }
        }
    });
}

/// No-op reload handler for non-Unix platforms.
#[cfg(not(unix))]
pub fn setup_reload_handler(_state: AppState) {
    tracing::warn!("Secret reload via SIGHUP not supported on this platform");
}
