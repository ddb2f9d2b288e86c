//! Meteor miner
//!
//! Long-running service that:
//! 1. Gathers user ids from `-u` flags and an optional list file
//! 2. Scans every user for claimable meteors, immediately and then hourly
//! 3. Mines each discovered meteor
//!
//! Runs until SIGINT/SIGTERM, then drains workers for up to `DRAIN_TIMEOUT`.

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use meteor_api::Client;
use meteor_pipeline::{Pipeline, PipelineConfig, SCAN_PERIOD};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;

/// How long workers get to finish after a shutdown signal
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Usage errors exit with status 2 before anything else starts
    let cli = Cli::parse();

    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting meteor-miner");

    let accounts = cli.accounts();
    if accounts.is_empty() {
        anyhow::bail!("no user ids to mine for; pass -u or a readable -f file");
    }

    let config_source = Config::resolve_path(cli.config.as_deref());
    info!(
        path = %config_source.path.display(),
        explicit = config_source.explicit,
        "loading configuration"
    );
    let config = Config::load_resolved(&config_source).with_context(|| {
        format!(
            "failed to load config from {}",
            config_source.path.display()
        )
    })?;

    let parallelism = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let sizes = config
        .pool_sizes(parallelism)
        .context("unable to assign workers to both pools")?;

    info!(
        accounts = accounts.len(),
        base_url = %config.client.base_url,
        timeout_secs = config.client.timeout_secs,
        parallelism,
        "configuration loaded"
    );

    if let Some(listen_addr) = config.metrics.listen_addr {
        install_metrics_exporter(listen_addr)?;
    }

    let client = Client::new(config.client_config()).context("failed to build HTTP client")?;
    let pipeline = Pipeline::new(
        accounts,
        Arc::new(client),
        PipelineConfig {
            sizes,
            retry: config.retry_policy(),
            scan_period: SCAN_PERIOD,
        },
    )
    .context("failed to start pipeline")?;

    let cancel = CancellationToken::new();
    let handle = pipeline.spawn(cancel.clone());

    shutdown_signal().await;
    cancel.cancel();

    // The drain timer starts at signal receipt
    match tokio::time::timeout(DRAIN_TIMEOUT, handle.join()).await {
        Ok(()) => info!("all workers stopped"),
        Err(_) => warn!(
            drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "drain timeout exceeded, forcing shutdown"
        ),
    }

    info!("shutdown complete");
    Ok(())
}

/// Serve Prometheus metrics on `listen_addr`.
fn install_metrics_exporter(listen_addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .install()
        .with_context(|| format!("failed to start metrics exporter on {listen_addr}"))?;
    info!(addr = %listen_addr, "metrics exporter listening");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
