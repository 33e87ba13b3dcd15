//! Demo binary hosting the server component in live mode.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use http_host::config::{self, ServerConfig};
use http_host::lifecycle::signals;
use http_host::observability;
use http_host::{EventBus, ExecutionMode, HttpServer};

#[derive(Parser)]
#[command(name = "http-host", about = "Embeddable HTTP server component, hosted standalone")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen port override (beats file and environment).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_tracing("http_host=debug,tower_http=debug");

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => ServerConfig::from_env(ExecutionMode::Live)?,
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    tracing::info!(port = config.port, mode = %config.mode, "configuration loaded");

    let events = Arc::new(EventBus::new());
    let server = Arc::new(HttpServer::init(config, events).await?);
    server.layer("trace", TraceLayer::new_for_http())?;
    server.layer("timeout", TimeoutLayer::new(Duration::from_secs(30)))?;
    server.get("/healthz", healthz)?;

    tokio::spawn(signals::shutdown_on_signal(Arc::clone(&server)));

    server.start().await?;
    tracing::info!("exited cleanly");
    Ok(())
}

async fn healthz() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
