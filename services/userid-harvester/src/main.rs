//! User id harvester
//!
//! One-shot utility that sweeps the public user-search endpoint with every
//! three-letter name prefix and writes the user ids it finds, one per line,
//! to a file `meteor-miner -f` can read.

mod harvest;

use anyhow::{Context, Result};
use clap::Parser;
use meteor_api::{CLIENT_USER_AGENT, DEFAULT_TIMEOUT, USERS_API_BASE};
use meteor_pipeline::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::harvest::{HarvestConfig, harvest, name_prefixes};

/// Collect user ids by searching every three-letter name prefix.
#[derive(Debug, Parser)]
#[command(name = "userid-harvester", version)]
struct Cli {
    /// File the ids are written to, one per line
    #[arg(long, value_name = "PATH", default_value = "userids.txt")]
    output: PathBuf,

    /// Concurrent searches (defaults to available parallelism)
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Attempts per prefix, rate-limited answers included
    #[arg(long, value_name = "N", default_value_t = 10)]
    max_attempts: u32,

    /// Base URL of the user-search API
    #[arg(long, value_name = "URL", env = "USERS_API_BASE", default_value = USERS_API_BASE)]
    users_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
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

    if cli.workers == Some(0) {
        anyhow::bail!("--workers must be greater than 0");
    }
    let workers = cli.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    let http = reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .user_agent(CLIENT_USER_AGENT)
        .build()
        .context("failed to build HTTP client")?;

    let config = HarvestConfig {
        users_base: cli.users_url,
        workers,
        retry: RetryPolicy::new(
            cli.max_attempts,
            Duration::from_millis(500),
            Duration::from_secs(30),
        ),
    };
    info!(
        users_url = %config.users_base,
        workers,
        max_attempts = config.retry.max_attempts,
        output = %cli.output.display(),
        "starting userid-harvester"
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    let report = harvest(http, &config, name_prefixes(), cancel).await;
    if !report.failed.is_empty() {
        warn!(
            count = report.failed.len(),
            prefixes = ?report.failed,
            "some prefixes were not searched successfully"
        );
    }
    if report.skipped > 0 {
        warn!(skipped = report.skipped, "sweep interrupted, writing partial results");
    }

    common::write_account_file(&cli.output, &report.ids)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!(
        ids = report.ids.len(),
        output = %cli.output.display(),
        "wrote user ids"
    );
    Ok(())
}

/// Wait for SIGTERM or SIGINT.
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
        _ = ctrl_c => info!("received SIGINT, stopping sweep"),
        _ = terminate => info!("received SIGTERM, stopping sweep"),
    }
}
