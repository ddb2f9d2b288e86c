//! Configuration types and loading
//!
//! The file is found via `--config`, else `CONFIG_PATH`, else
//! `meteor-miner.toml` in the working directory. Every TOML section is
//! optional and unset keys take their defaults; a missing default file means
//! "run with defaults".

use meteor_api::{ACCOUNT_API_BASE, CLIENT_USER_AGENT, ClientConfig, DEFAULT_TIMEOUT};
use meteor_pipeline::{PoolSizes, RetryPolicy};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read when neither `--config` nor `CONFIG_PATH` is given
pub const DEFAULT_CONFIG_FILE: &str = "meteor-miner.toml";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub client: ClientSection,
    pub pipeline: PipelineSection,
    pub metrics: MetricsSection,
}

/// Remote API settings shared by the catalog and action calls
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: ACCOUNT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: CLIENT_USER_AGENT.to_string(),
        }
    }
}

/// Worker pools and retry
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSection {
    /// Overrides the parallelism-derived discovery pool size
    pub discovery_workers: Option<usize>,
    /// Overrides the parallelism-derived processing pool size
    pub processing_workers: Option<usize>,
    /// Attempts per remote call; 1 disables retry
    pub retry_attempts: u32,
    pub retry_initial_backoff_ms: u64,
    pub retry_max_backoff_ms: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            discovery_workers: None,
            processing_workers: None,
            retry_attempts: 1,
            retry_initial_backoff_ms: 500,
            retry_max_backoff_ms: 5_000,
        }
    }
}

/// Prometheus exporter
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsSection {
    pub listen_addr: Option<SocketAddr>,
}

/// Where the config came from and whether it had to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    pub path: PathBuf,
    /// Named by `--config` or `CONFIG_PATH`; missing is then an error
    pub explicit: bool,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a resolved path. A missing implicit default file yields
    /// the default configuration.
    pub fn load_resolved(source: &ConfigPath) -> common::Result<Self> {
        if !source.explicit && !source.path.exists() {
            return Ok(Config::default());
        }
        Self::load(&source.path)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&Path>) -> ConfigPath {
        if let Some(p) = cli_path {
            return ConfigPath {
                path: p.to_path_buf(),
                explicit: true,
            };
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return ConfigPath {
                path: PathBuf::from(p),
                explicit: true,
            };
        }
        ConfigPath {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            explicit: false,
        }
    }

    fn validate(&self) -> common::Result<()> {
        let client = &self.client;
        if !client.base_url.starts_with("http://") && !client.base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                client.base_url
            )));
        }

        if client.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if client.user_agent.trim().is_empty() {
            return Err(common::Error::Config("user_agent must not be empty".into()));
        }

        let pipeline = &self.pipeline;
        if pipeline.discovery_workers == Some(0) {
            return Err(common::Error::Config(
                "discovery_workers must be greater than 0".into(),
            ));
        }
        if pipeline.processing_workers == Some(0) {
            return Err(common::Error::Config(
                "processing_workers must be greater than 0".into(),
            ));
        }
        if pipeline.retry_attempts == 0 {
            return Err(common::Error::Config(
                "retry_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Immutable client settings shared by both remote calls.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.client.base_url.clone(),
            timeout: Duration::from_secs(self.client.timeout_secs),
            user_agent: self.client.user_agent.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let pipeline = &self.pipeline;
        RetryPolicy::new(
            pipeline.retry_attempts,
            Duration::from_millis(pipeline.retry_initial_backoff_ms),
            Duration::from_millis(pipeline.retry_max_backoff_ms),
        )
    }

    /// Pool sizes: explicit overrides win, anything unset comes from the
    /// split of `parallelism`.
    pub fn pool_sizes(&self, parallelism: usize) -> meteor_pipeline::Result<PoolSizes> {
        let pipeline = &self.pipeline;
        match (pipeline.discovery_workers, pipeline.processing_workers) {
            (Some(discovery), Some(processing)) => PoolSizes::new(discovery, processing),
            (discovery, processing) => {
                let split = PoolSizes::from_parallelism(parallelism)?;
                PoolSizes::new(
                    discovery.unwrap_or(split.discovery()),
                    processing.unwrap_or(split.processing()),
                )
            }
        }
    }
}
