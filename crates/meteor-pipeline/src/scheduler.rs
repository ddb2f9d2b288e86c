//! Scan scheduler
//!
//! Pure state machine plus the loop that executes it. The loop seeds one
//! `ScanJob` per account (blocking on scan queue capacity), then waits for
//! the period to elapse, forever. Seeding starts immediately; there is no
//! initial delay and no skip-on-success: every account is rescanned every
//! cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::job::ScanJob;

/// Scheduler states. `cycle` counts from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Submitting one scan job per account
    Seeding { cycle: u64 },
    /// Idle until the period elapses
    Waiting { cycle: u64 },
}

impl SchedulerState {
    /// Startup state: seed the first cycle right away.
    pub fn initial() -> Self {
        SchedulerState::Seeding { cycle: 1 }
    }

    pub fn cycle(&self) -> u64 {
        match self {
            SchedulerState::Seeding { cycle } | SchedulerState::Waiting { cycle } => *cycle,
        }
    }
}

/// Events that drive scheduler transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// The last account of the cycle was queued
    AccountsSubmitted,
    /// The period timer fired
    PeriodElapsed,
}

/// Actions the loop executes after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerAction {
    /// Queue a scan for every account
    SubmitAll,
    /// Sleep until the next period tick
    WaitForPeriod,
    /// No-op
    None,
}

/// Handle a state transition. Pure function: no I/O.
pub fn handle_event(
    state: SchedulerState,
    event: SchedulerEvent,
) -> (SchedulerState, SchedulerAction) {
    match (state, event) {
        (SchedulerState::Seeding { cycle }, SchedulerEvent::AccountsSubmitted) => (
            SchedulerState::Waiting { cycle },
            SchedulerAction::WaitForPeriod,
        ),
        (SchedulerState::Waiting { cycle }, SchedulerEvent::PeriodElapsed) => (
            SchedulerState::Seeding { cycle: cycle + 1 },
            SchedulerAction::SubmitAll,
        ),
        // --- Invalid/unhandled transition: stay in current state ---
        (state, _event) => (state, SchedulerAction::None),
    }
}

/// Periodically re-seeds the scan queue with every configured account.
pub(crate) struct Scheduler {
    pub accounts: Arc<[Arc<str>]>,
    pub scans: mpsc::Sender<ScanJob>,
    pub period: Duration,
}

impl Scheduler {
    /// Run until `cancel` fires or the scan queue closes.
    pub(crate) async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately and marks the start of cycle 1
        ticker.tick().await;

        let mut state = SchedulerState::initial();
        let mut action = SchedulerAction::SubmitAll;

        loop {
            let event = match action {
                SchedulerAction::SubmitAll => {
                    if !self.seed(state.cycle(), &cancel).await {
                        break;
                    }
                    SchedulerEvent::AccountsSubmitted
                }
                SchedulerAction::WaitForPeriod => {
                    debug!(
                        cycle = state.cycle(),
                        period_secs = self.period.as_secs(),
                        "waiting for next scan cycle"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {}
                    }
                    SchedulerEvent::PeriodElapsed
                }
                SchedulerAction::None => break,
            };
            (state, action) = handle_event(state, event);
        }

        debug!(cycle = state.cycle(), "scheduler stopped");
    }

    /// Queue one scan per account. Returns false if interrupted.
    async fn seed(&self, cycle: u64, cancel: &CancellationToken) -> bool {
        info!(cycle, accounts = self.accounts.len(), "starting scan cycle");
        for account in self.accounts.iter() {
            let job = ScanJob {
                account: account.clone(),
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                sent = self.scans.send(job) => {
                    if sent.is_err() {
                        return false;
                    }
                }
            }
            debug!(cycle, account = &**account, "queued account scan");
        }
        true
    }
}
