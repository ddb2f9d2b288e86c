//! Bounded retry with exponential backoff for transient remote failures
//!
//! Only transport failures, non-2xx statuses and rate limiting are retried.
//! Domain answers (user not found, already mined, ...) are final for the
//! cycle. The default policy makes a single attempt; anything still missing
//! is picked up by the next scan cycle.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

/// How many times, and how patiently, to repeat a transiently failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; always at least 1
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retry.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
        }
    }

    /// Backoff before attempt `attempt + 1`, doubling from `initial_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Run `operation` until it succeeds, fails non-transiently, exhausts the
/// policy, or `cancel` fires during a backoff wait.
///
/// `operation` receives the 1-based attempt number. A rate-limited failure
/// waits at least as long as the server asked.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> meteor_api::Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = meteor_api::Result<T>>,
{
    let mut attempt = 1;
    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_transient() || attempt >= policy.max_attempts {
            return Err(err);
        }

        let mut wait = policy.backoff(attempt);
        if let meteor_api::Error::RateLimited { retry_after } = &err {
            wait = wait.max(*retry_after);
        }
        warn!(
            attempt,
            max_attempts = policy.max_attempts,
            backoff_ms = wait.as_millis() as u64,
            kind = err.kind(),
            error = %err,
            "transient failure, retrying"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(err),
            _ = tokio::time::sleep(wait) => {}
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meteor_api::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(
            max_attempts,
            Duration::from_millis(100),
            Duration::from_millis(400),
        )
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = policy(10);
        assert_eq!(p.backoff(1), Duration::from_millis(100));
        assert_eq!(p.backoff(2), Duration::from_millis(200));
        assert_eq!(p.backoff(3), Duration::from_millis(400));
        assert_eq!(p.backoff(9), Duration::from_millis(400));
        assert_eq!(p.backoff(64), Duration::from_millis(400));
    }

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO).max_attempts, 1);
        assert_eq!(RetryPolicy::default(), RetryPolicy::none());
    }

    #[tokio::test(start_paused = true)]
    async fn default_policy_makes_one_attempt() {
        let calls = AtomicU32::new(0);
        let result: meteor_api::Result<()> =
            with_retry(&RetryPolicy::none(), &CancellationToken::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Transport("connection reset".into())) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_retry_until_success() {
        let result = with_retry(&policy(3), &CancellationToken::new(), |attempt| async move {
            if attempt < 3 {
                Err(Error::BadStatus(503))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_stop_at_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: meteor_api::Result<()> =
            with_retry(&policy(3), &CancellationToken::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::BadStatus(502)) }
            })
            .await;
        assert!(matches!(result, Err(Error::BadStatus(502))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn domain_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: meteor_api::Result<()> =
            with_retry(&policy(5), &CancellationToken::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::DatabaseIssue) }
            })
            .await;
        assert!(matches!(result, Err(Error::DatabaseIssue)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_waits_for_retry_after() {
        let start = tokio::time::Instant::now();
        let result = with_retry(&policy(2), &CancellationToken::new(), |attempt| async move {
            if attempt == 1 {
                Err(Error::RateLimited {
                    retry_after: Duration::from_secs(30),
                })
            } else {
                Ok(())
            }
        })
        .await;
        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_backoff() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = AtomicU32::new(0);
        let result: meteor_api::Result<()> = with_retry(&policy(5), &cancel, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::Transport("timeout".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
