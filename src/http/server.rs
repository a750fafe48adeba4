//! HTTP server startup and drain logic.

use std::future::Future;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::Router;
use axum_server::Handle;
use tokio::sync::watch;

use crate::config::SHUTDOWN_GRACE_SECS;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind server to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("Server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Lifecycle phase of a [`Server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
    Created,
    Listening,
    ShuttingDown,
    Stopped,
}

/// How the server finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// All connections finished within the grace period
    Drained,
    /// The grace period ran out and remaining connections were closed
    ForcedClose,
}

/// An HTTP server bound to a listening socket.
pub struct Server {
    listener: std::net::TcpListener,
    local_addr: SocketAddr,
    grace_period: Duration,
    phase: watch::Sender<ServerPhase>,
}

impl Server {
    /// Bind to `addr`. Nothing is served until [`Server::serve`] is called.
    pub fn bind(addr: SocketAddr) -> Result<Self, ServerError> {
        let bind_err = |source| ServerError::Bind { addr, source };

        let listener = std::net::TcpListener::bind(addr).map_err(bind_err)?;
        listener.set_nonblocking(true).map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;
        let (phase, _) = watch::channel(ServerPhase::Created);

        Ok(Self {
            listener,
            local_addr,
            grace_period: Duration::from_secs(SHUTDOWN_GRACE_SECS),
            phase,
        })
    }

    /// Override the time in-flight requests get to finish after shutdown starts.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Address actually bound (resolves port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Watch lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<ServerPhase> {
        self.phase.subscribe()
    }

    /// Serve `app` until `shutdown` resolves, then drain.
    ///
    /// New connections stop being accepted as soon as `shutdown` fires. In-flight
    /// requests get the grace period to finish before being closed.
    pub async fn serve<F>(self, app: Router, shutdown: F) -> Result<ShutdownOutcome, ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let Server {
            listener,
            local_addr,
            grace_period,
            phase,
        } = self;

        let handle = Handle::new();
        let server = axum_server::from_tcp(listener).handle(handle.clone());
        let mut serving =
            tokio::spawn(async move { server.serve(app.into_make_service()).await });

        phase.send_replace(ServerPhase::Listening);
        tracing::info!(addr = %local_addr, "Listening for connections");

        tokio::select! {
            _ = shutdown => {}
            result = &mut serving => {
                phase.send_replace(ServerPhase::Stopped);
                tracing::error!("HTTP server stopped without a shutdown signal");
                result?.map_err(ServerError::Serve)?;
                return Ok(ShutdownOutcome::Drained);
            }
        }

        phase.send_replace(ServerPhase::ShuttingDown);
        tracing::info!(
            grace_secs = grace_period.as_secs_f64(),
            connections = handle.connection_count(),
            "Shutting down, waiting for in-flight requests"
        );

        let started = Instant::now();
        handle.graceful_shutdown(Some(grace_period));
        let result = serving.await;
        let outcome = if started.elapsed() >= grace_period {
            tracing::warn!(
                grace_secs = grace_period.as_secs_f64(),
                "Grace period exceeded, remaining connections were closed"
            );
            ShutdownOutcome::ForcedClose
        } else {
            tracing::info!("Server gracefully stopped");
            ShutdownOutcome::Drained
        };
        phase.send_replace(ServerPhase::Stopped);

        result?.map_err(ServerError::Serve)?;
        Ok(outcome)
    }
}
