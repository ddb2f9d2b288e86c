//! Processing workers: mine one discovered meteor per job
//!
//! `Success` and `AlreadyDone` are terminal non-failures. An already-mined
//! meteor is expected whenever a rescan rediscovers a meteor claimed since
//! the previous cycle. Everything else is logged as a failure and dropped;
//! jobs are never re-enqueued.

use std::sync::Arc;

use meteor_api::Outcome;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::job::ProcessJob;
use crate::metrics;
use crate::queue::{self, SharedReceiver};
use crate::remote::Remote;
use crate::retry::{RetryPolicy, with_retry};

/// Mine the meteor named by `job` and log the result.
///
/// Returns the remote's answer so callers can inspect it; the worker loop
/// ignores it.
pub async fn process(
    job: &ProcessJob,
    remote: &dyn Remote,
    retry: &RetryPolicy,
    cancel: &CancellationToken,
) -> meteor_api::Result<Outcome> {
    let account: &str = &job.account;
    let item_id = job.item_id;
    debug!(account, item_id, "mining meteor");

    let result = with_retry(retry, cancel, move |_| remote.claim_item(account, item_id)).await;

    match &result {
        Ok(Outcome::Success) => info!(account, item_id, "mined meteor"),
        Ok(Outcome::AlreadyDone) => info!(account, item_id, "meteor already mined"),
        Ok(outcome) => warn!(
            account,
            item_id,
            outcome = outcome.label(),
            "meteor mine rejected"
        ),
        Err(e) => warn!(
            account,
            item_id,
            kind = e.kind(),
            error = %e,
            "meteor mine failed"
        ),
    }
    metrics::record_claim(match &result {
        Ok(outcome) => outcome.label(),
        Err(e) => e.kind(),
    });

    result
}

/// Processing worker loop. Exits on cancellation or when the mine queue
/// closes.
pub(crate) async fn run_processing_worker(
    worker: usize,
    jobs: SharedReceiver<ProcessJob>,
    remote: Arc<dyn Remote>,
    retry: RetryPolicy,
    cancel: CancellationToken,
) {
    debug!(worker, "processing worker started");

    loop {
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            job = queue::next(&jobs) => job,
        };
        let Some(job) = job else { break };

        // Outcome already logged; a failed job waits for the next cycle
        let _ = process(&job, remote.as_ref(), &retry, &cancel).await;
    }

    debug!(worker, "processing worker stopped");
}
