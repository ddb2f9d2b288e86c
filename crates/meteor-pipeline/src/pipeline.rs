//! Pipeline wiring and lifecycle
//!
//! Builds both bounded queues (capacity = pool size), spawns the discovery
//! and processing pools and the scheduler, and hands back a handle that
//! joins them after cancellation.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::discovery::run_discovery_worker;
use crate::error::{Error, Result};
use crate::job::{ProcessJob, ScanJob};
use crate::processing::run_processing_worker;
use crate::queue;
use crate::remote::Remote;
use crate::retry::RetryPolicy;
use crate::scheduler::Scheduler;
use crate::sizing::PoolSizes;

/// Time between scan cycles.
pub const SCAN_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Tunables for one pipeline instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub sizes: PoolSizes,
    pub retry: RetryPolicy,
    pub scan_period: Duration,
}

impl PipelineConfig {
    /// Default retry policy (single attempt) and the fixed one-hour period.
    pub fn new(sizes: PoolSizes) -> Self {
        Self {
            sizes,
            retry: RetryPolicy::none(),
            scan_period: SCAN_PERIOD,
        }
    }
}

/// A validated, not yet running pipeline.
pub struct Pipeline {
    accounts: Arc<[Arc<str>]>,
    remote: Arc<dyn Remote>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate inputs. An empty account list refuses to start; pool sizes
    /// are already guaranteed non-zero by `PoolSizes`.
    pub fn new(
        accounts: Vec<String>,
        remote: Arc<dyn Remote>,
        config: PipelineConfig,
    ) -> Result<Self> {
        if accounts.is_empty() {
            return Err(Error::NoAccounts);
        }
        if config.scan_period.is_zero() {
            return Err(Error::ZeroScanPeriod);
        }
        let accounts: Vec<Arc<str>> = accounts.into_iter().map(Arc::from).collect();
        Ok(Self {
            accounts: accounts.into(),
            remote,
            config,
        })
    }

    pub fn accounts(&self) -> usize {
        self.accounts.len()
    }

    /// Spawn every task. They run until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> PipelineHandle {
        let sizes = self.config.sizes;
        let (scan_tx, scan_rx) = queue::bounded::<ScanJob>(sizes.discovery());
        let (mine_tx, mine_rx) = queue::bounded::<ProcessJob>(sizes.processing());

        info!(
            accounts = self.accounts.len(),
            discovery_workers = sizes.discovery(),
            processing_workers = sizes.processing(),
            retry_attempts = self.config.retry.max_attempts,
            scan_period_secs = self.config.scan_period.as_secs(),
            "starting meteor pipeline"
        );

        let mut tasks = Vec::with_capacity(sizes.discovery() + sizes.processing() + 1);

        for worker in 0..sizes.processing() {
            tasks.push(tokio::spawn(run_processing_worker(
                worker,
                mine_rx.clone(),
                self.remote.clone(),
                self.config.retry,
                cancel.clone(),
            )));
        }

        for worker in 0..sizes.discovery() {
            tasks.push(tokio::spawn(run_discovery_worker(
                worker,
                scan_rx.clone(),
                mine_tx.clone(),
                self.remote.clone(),
                self.config.retry,
                cancel.clone(),
            )));
        }
        // Only discovery workers hold mine senders from here on
        drop(mine_tx);

        let scheduler = Scheduler {
            accounts: self.accounts,
            scans: scan_tx,
            period: self.config.scan_period,
        };
        tasks.push(tokio::spawn(scheduler.run(cancel)));

        PipelineHandle { tasks }
    }
}

/// Running pipeline tasks.
pub struct PipelineHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Number of spawned tasks: both pools plus the scheduler.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every task to finish. Panicked tasks are logged, not
    /// propagated.
    pub async fn join(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                error!(error = %e, "pipeline task failed");
            }
        }
    }
}
