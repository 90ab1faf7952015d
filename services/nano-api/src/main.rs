//! Nano API Server
//!
//! Serves workspaces and datasets from the configured repository.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use nano_api::config::ServerConfig;
use nano_api::{build_router, AppState, HandlerRegistry};

/// Nano API Server
#[derive(Parser, Debug)]
#[command(name = "nano-api")]
#[command(about = "Minimal HTTP service for geospatial workspaces and datasets")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8090", env = "NANO_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Directory with server.yaml and workspace YAML files
    #[arg(long, default_value = "config", env = "NANO_CONFIG_DIR")]
    config_dir: PathBuf,

    /// Directory with page templates
    #[arg(long, default_value = "templates", env = "NANO_TEMPLATE_DIR")]
    template_dir: PathBuf,

    /// Number of worker threads
    #[arg(long, env = "NANO_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting nano API server");

    let config = ServerConfig::load(&args.config_dir, &args.template_dir)?;
    let state = AppState::new(config).with_prometheus(prometheus_handle);
    let registry = HandlerRegistry::with_defaults(&state)
        .context("Failed to initialise handlers")?;

    info!(handlers = ?registry.names(), "Handlers registered");

    let app = build_router(Arc::new(state), Arc::new(registry));

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Nano API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
