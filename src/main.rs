//! Annotation collection service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request id, trace, timeout, limits, metrics)
//!                         │
//!                         ├─▶ frontend::pages   GET /, GET /annotate (header + shell)
//!                         │
//!                         ├─▶ routing::table    /api/annotations, /api/session
//!                         │       │
//!                         │       ▼
//!                         │   routing::pipeline (guards, fail fast)
//!                         │       │
//!                         │       ▼
//!                         │   annotations / session controllers
//!                         │       │
//!                         │       ▼
//!                         │   AnnotationStore, SessionStore (dashmap)
//!                         │
//!     Client Response ◀───┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use annotation_service::annotations::AnnotationStore;
use annotation_service::config::{load_config, ServiceConfig};
use annotation_service::observability::{logging, metrics};
use annotation_service::{AppState, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "annotation-service")]
#[command(about = "Annotation collection web service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("annotation-service v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        attributes = config.annotations.attributes.len(),
        items = config.annotations.items.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let store = match &config.annotations.snapshot_path {
        Some(path) => AnnotationStore::load_from_file(path)?,
        None => AnnotationStore::new(None),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(AppState::with_store(config, store))?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();
    server.run_and_snapshot(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
