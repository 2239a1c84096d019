//! Portfolio API server.
//!
//! ```text
//!     Client ──▶ listener ──▶ pipeline (panic, request id, client ip, access log,
//!                              security headers, body cap, global limit, CORS)
//!                         ──▶ route table ──▶ [route limiter] ──▶ handler
//!                         ──▶ portfolio service ──▶ document store
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use portfolio_api::config;
use portfolio_api::lifecycle::{shutdown_signal, Shutdown};
use portfolio_api::observability::{logging, metrics};
use portfolio_api::store::{DocumentStore, MemoryStore};
use portfolio_api::{AppServer, Limiters};

#[derive(Parser)]
#[command(name = "portfolio-api", version, about = "Portfolio API server", long_about = None)]
struct Cli {
    /// TOML configuration file. Falls back to $PORTFOLIO_CONFIG, then defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    logging::init(&config.observability, config.environment);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "portfolio-api starting"
    );
    tracing::info!(
        bind_address = %config.server.bind_address,
        allowed_origins = ?config.cors.allowed_origins,
        max_body_bytes = config.limits.max_body_bytes,
        global_limit = config.rate_limit.global.limit,
        contacts_limit = config.rate_limit.contacts.limit,
        questions_limit = config.rate_limit.questions.limit,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let store: Arc<dyn DocumentStore> = match &config.store.seed_path {
        Some(path) => Arc::new(MemoryStore::from_seed_file(Path::new(path))?),
        None => {
            tracing::warn!("No seed data configured, starting with an empty store");
            Arc::new(MemoryStore::new())
        }
    };

    let limiters = Limiters::spawn(&config.rate_limit)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    AppServer::new(&config, store, limiters)
        .run(listener, shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
