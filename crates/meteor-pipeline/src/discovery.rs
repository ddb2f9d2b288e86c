//! Discovery workers: scan an account, fan out one mine job per meteor
//!
//! A worker blocks on the scan queue with no timeout; that wait is the
//! pipeline's back-pressure. Enqueueing onto the mine queue blocks too when
//! processing falls behind, which throttles discovery to processing speed.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::job::{ProcessJob, ScanJob};
use crate::metrics;
use crate::queue::{self, SharedReceiver};
use crate::remote::Remote;
use crate::retry::{RetryPolicy, with_retry};

/// What a single scan job produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Scan succeeded and every discovered meteor was enqueued
    Enqueued(usize),
    /// Scan failed with the given error kind; nothing was enqueued
    Failed(&'static str),
    /// Shutdown or a closed mine queue cut enqueueing short
    Interrupted { enqueued: usize },
}

/// Scan `job.account` and enqueue a `ProcessJob` for every meteor returned.
///
/// The scan is attempted per `retry` (once by default). Failures are logged
/// and dropped; the next scan cycle supersedes them.
pub async fn discover(
    job: &ScanJob,
    remote: &dyn Remote,
    mine_queue: &mpsc::Sender<ProcessJob>,
    retry: &RetryPolicy,
    cancel: &CancellationToken,
) -> ScanOutcome {
    let account: &str = &job.account;
    info!(account, "scanning for meteors");

    let meteors = match with_retry(retry, cancel, move |_| remote.fetch_items(account)).await {
        Ok(meteors) => meteors,
        Err(e) => {
            warn!(account, kind = e.kind(), error = %e, "meteor scan failed");
            metrics::record_scan(e.kind());
            return ScanOutcome::Failed(e.kind());
        }
    };

    // Remote-controlled values; saturate rather than overflow
    let nuggets = meteors
        .iter()
        .fold(0i64, |total, m| total.saturating_add(m.nuggets));
    info!(account, count = meteors.len(), nuggets, "found meteors");
    metrics::record_scan("ok");
    metrics::record_items_discovered(meteors.len());

    let mut enqueued = 0;
    for meteor in &meteors {
        let mine = ProcessJob::for_meteor(job, meteor);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return ScanOutcome::Interrupted { enqueued },
            sent = mine_queue.send(mine) => {
                if sent.is_err() {
                    return ScanOutcome::Interrupted { enqueued };
                }
            }
        }
        debug!(account, item_id = meteor.id, "queued meteor");
        enqueued += 1;
    }

    ScanOutcome::Enqueued(enqueued)
}

/// Discovery worker loop. Exits on cancellation, when the scan queue closes,
/// or when the mine queue is gone.
pub(crate) async fn run_discovery_worker(
    worker: usize,
    scans: SharedReceiver<ScanJob>,
    mine_queue: mpsc::Sender<ProcessJob>,
    remote: Arc<dyn Remote>,
    retry: RetryPolicy,
    cancel: CancellationToken,
) {
    debug!(worker, "discovery worker started");

    loop {
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            job = queue::next(&scans) => job,
        };
        let Some(job) = job else { break };

        if let ScanOutcome::Interrupted { .. } =
            discover(&job, remote.as_ref(), &mine_queue, &retry, &cancel).await
        {
            break;
        }
    }

    debug!(worker, "discovery worker stopped");
}
