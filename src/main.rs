//! toy-service entry point.
//!
//! Initializes tracing, loads configuration from the environment, seeds the
//! runtime secret, builds the router and serves until SIGINT/SIGTERM.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use toy_service::config::{LogFormat, LoggingConfig, DEFAULT_LOG_FILTER};
use toy_service::http::{self, Server};
use toy_service::secret::SecretStore;
use toy_service::{create_router, AppConfig, AppState};

/// toy-service: health, echo and build info over HTTP
#[derive(Parser, Debug)]
#[command(name = "toy-service", version, about)]
struct Args {
    /// Log level filter (e.g., "toy_service=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log format: "text" or "json"
    #[arg(long)]
    log_format: Option<String>,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Priority: CLI > env > default
    let logging = LoggingConfig::resolve(args.log_level, args.log_format, |key| {
        std::env::var(key).ok()
    });
    init_tracing(&logging);
    if let Some(format) = &logging.unknown_format {
        tracing::warn!(format = %format, "Unknown log format, using text");
    }

    tracing::info!("Starting toy-service server");

    let config = AppConfig::from_env();
    let secret = SecretStore::from_env();
    tracing::info!(
        env = %config.service.env,
        version = %config.service.version,
        commit = %config.service.git_commit,
        secret_dir = %config.secret_file_dir.display(),
        fake_secret_present = secret.get().is_present(),
        "Loaded configuration"
    );

    let state = AppState::from_config(&config, secret);
    http::setup_reload_handler(state.clone());

    let app = create_router(state);

    // Bind failure is fatal: main returns the error and the process exits non-zero
    let server = Server::bind(config.listen_addr)?;
    let outcome = server.serve(app, http::shutdown_signal()).await?;

    tracing::info!(?outcome, "Shutdown complete");
    Ok(())
}
