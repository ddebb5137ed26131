//! Pixel API Server
//!
//! Serves satellite imagery around a point as a flat grid of RGB triples.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use pixel_api::build_router;
use pixel_api::config::ServiceConfig;
use pixel_api::state::AppState;

/// Pixel API Server
#[derive(Parser, Debug)]
#[command(name = "pixel-api")]
#[command(about = "Satellite imagery to pixel grid HTTP server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:5000", env = "PIXEL_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "PIXEL_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// YAML configuration file
    #[arg(short, long, env = "PIXEL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the imagery export URL
    #[arg(long, env = "IMAGERY_EXPORT_URL")]
    export_url: Option<String>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
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
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if let Some(url) = args.export_url {
        config.provider.export_url = url;
        config.validate()?;
    }

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    info!(
        export_url = %config.provider.export_url,
        tile_size = config.pipeline.tile_size,
        output_resolution = config.pipeline.output_resolution,
        request_timeout_secs = config.request_timeout_secs,
        "Starting pixel API server"
    );

    let state = Arc::new(AppState::new(&config, Some(prometheus))?);
    let app = build_router(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Pixel API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
