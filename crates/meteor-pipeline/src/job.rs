//! Jobs flowing through the two queues

use std::sync::Arc;

use meteor_api::Meteor;

/// Scan one account for claimable meteors. One attempt per cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanJob {
    pub account: Arc<str>,
}

/// Mine one discovered meteor for one account. One attempt per enqueue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessJob {
    pub account: Arc<str>,
    pub item_id: u64,
}

impl ProcessJob {
    /// Derive the job for a meteor returned by a successful scan of `scan`.
    pub fn for_meteor(scan: &ScanJob, meteor: &Meteor) -> Self {
        Self {
            account: scan.account.clone(),
            item_id: meteor.id,
        }
    }
}
