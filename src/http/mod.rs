//! HTTP server lifecycle.
//!
//! The server moves through `Created → Listening → ShuttingDown → Stopped`:
//! - The listener is bound up front; a bind failure is fatal
//! - Connections are served on a spawned task
//! - SIGTERM/SIGINT start a graceful shutdown bounded by a grace period
//! - SIGHUP reloads the runtime secret from disk

mod server;
mod shutdown;

pub use server::{Server, ServerError, ServerPhase, ShutdownOutcome};
pub use shutdown::{setup_reload_handler, shutdown_signal};
