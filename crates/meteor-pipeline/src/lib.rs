//! Two-stage meteor mining pipeline
//!
//! Discovers claimable meteors for a fixed set of users and mines each one
//! through two differently sized worker pools joined by bounded queues:
//!
//! ```text
//! Scheduler -> scan queue -> discovery workers -> mine queue -> processing workers
//! ```
//!
//! 1. The scheduler submits one `ScanJob` per user, immediately and then every
//!    scan period
//! 2. A discovery worker lists the user's meteors and enqueues one `ProcessJob`
//!    per meteor, blocking while the mine queue is full
//! 3. A processing worker mines one meteor per job
//!
//! Failures are logged at the worker that hit them and the job is dropped;
//! the next cycle rediscovers anything still unmined. Queue capacities equal
//! the pool sizes, so back-pressure flows from processing to discovery to
//! the scheduler.

pub mod discovery;
pub mod error;
pub mod job;
pub mod metrics;
pub mod pipeline;
pub mod processing;
mod queue;
pub mod remote;
pub mod retry;
pub mod scheduler;
pub mod sizing;

pub use error::{Error, Result};
pub use job::{ProcessJob, ScanJob};
pub use pipeline::{Pipeline, PipelineConfig, PipelineHandle, SCAN_PERIOD};
pub use remote::Remote;
pub use retry::RetryPolicy;
pub use scheduler::{SchedulerAction, SchedulerEvent, SchedulerState};
pub use sizing::PoolSizes;

#[cfg(test)]
pub(crate) mod fake;
