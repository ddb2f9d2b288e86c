//! Prefix sweep over the user-search endpoint
//!
//! Every three-letter lowercase prefix is one job. A fixed pool of workers
//! pulls jobs from a bounded queue and searches each prefix, retrying
//! rate-limited and transient failures per the retry policy. Results are
//! reassembled in prefix order and de-duplicated.

use std::collections::HashSet;
use std::sync::Arc;

use meteor_pipeline::RetryPolicy;
use meteor_pipeline::retry::with_retry;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Progress is logged at info every this many finished prefixes
const PROGRESS_EVERY: usize = 1000;

/// All prefixes `aaa`..`zzz` in lexicographic order.
pub fn name_prefixes() -> Vec<String> {
    let mut prefixes = Vec::with_capacity(26 * 26 * 26);
    for x in 'a'..='z' {
        for y in 'a'..='z' {
            for z in 'a'..='z' {
                prefixes.push(String::from_iter([x, y, z]));
            }
        }
    }
    prefixes
}

/// Drop repeated ids, keeping the first occurrence.
pub fn dedupe(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Sweep settings.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub users_base: String,
    pub workers: usize,
    pub retry: RetryPolicy,
}

/// What a sweep produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Unique ids in prefix order
    pub ids: Vec<String>,
    /// Prefixes that exhausted their retries
    pub failed: Vec<String>,
    /// Prefixes not searched to completion because the sweep was cancelled
    pub skipped: usize,
}

/// Search every prefix in `prefixes` and collect the user ids found.
pub async fn harvest(
    http: reqwest::Client,
    config: &HarvestConfig,
    prefixes: Vec<String>,
    cancel: CancellationToken,
) -> HarvestReport {
    let total = prefixes.len();
    let workers = config.workers.max(1);
    let (job_tx, job_rx) = mpsc::channel::<(usize, String)>(workers);
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (done_tx, mut done_rx) = mpsc::channel::<(usize, Option<Vec<String>>)>(workers);

    info!(prefixes = total, workers, "starting user id sweep");

    let feeder = {
        let cancel = cancel.clone();
        let jobs: Vec<(usize, String)> = prefixes.iter().cloned().enumerate().collect();
        tokio::spawn(async move {
            for job in jobs {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    sent = job_tx.send(job) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    };

    for worker in 0..workers {
        let http = http.clone();
        let users_base = config.users_base.clone();
        let retry = config.retry;
        let job_rx = job_rx.clone();
        let done_tx = done_tx.clone();
        let cancel = cancel.clone();

        tokio::spawn(async move {
            debug!(worker, "search worker started");
            loop {
                let job = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    job = async { job_rx.lock().await.recv().await } => job,
                };
                let Some((index, prefix)) = job else { break };

                let (client, base, name) = (&http, users_base.as_str(), prefix.as_str());
                let result = with_retry(&retry, &cancel, move |_| {
                    meteor_api::search_users(client, base, name)
                })
                .await;

                let found = match result {
                    Ok(ids) => {
                        debug!(worker, prefix = %prefix, count = ids.len(), "searched prefix");
                        Some(ids)
                    }
                    // Interrupted mid-retry: the prefix counts as skipped, not failed
                    Err(_) if cancel.is_cancelled() => break,
                    Err(e) => {
                        warn!(worker, prefix = %prefix, kind = e.kind(), error = %e, "prefix search failed");
                        None
                    }
                };
                if done_tx.send((index, found)).await.is_err() {
                    break;
                }
            }
            debug!(worker, "search worker stopped");
        });
    }
    drop(done_tx);

    let mut by_prefix: Vec<Option<Option<Vec<String>>>> = vec![None; total];
    let mut finished = 0;
    while let Some((index, found)) = done_rx.recv().await {
        by_prefix[index] = Some(found);
        finished += 1;
        if finished % PROGRESS_EVERY == 0 {
            info!(finished, total, "sweep progress");
        }
    }
    // Workers are gone; the feeder can only be parked on cancellation
    feeder.abort();

    let mut report = HarvestReport::default();
    let mut found_ids = Vec::new();
    for (prefix, slot) in prefixes.into_iter().zip(by_prefix) {
        match slot {
            Some(Some(ids)) => found_ids.extend(ids),
            Some(None) => report.failed.push(prefix),
            None => report.skipped += 1,
        }
    }
    report.ids = dedupe(found_ids);

    info!(
        ids = report.ids.len(),
        failed = report.failed.len(),
        skipped = report.skipped,
        "user id sweep finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[derive(Clone, Copy)]
    enum Mode {
        /// Each prefix `p` returns `U-p` plus a shared id
        Echo,
        /// First request is rate limited, then echo
        LimitedOnce,
        /// Always 500
        Broken,
    }

    #[derive(Clone)]
    struct MockState {
        mode: Mode,
        hits: Arc<AtomicUsize>,
    }

    async fn users_handler(
        State(state): State<MockState>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        let hit = state.hits.fetch_add(1, Ordering::SeqCst);
        let name = query.get("name").cloned().unwrap_or_default();
        match state.mode {
            Mode::Broken => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            Mode::LimitedOnce if hit == 0 => {
                (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "0")]).into_response()
            }
            Mode::Echo | Mode::LimitedOnce => format!(
                r#"[{{"id":"U-{name}","username":"{name}"}},{{"id":"U-shared"}}]"#
            )
            .into_response(),
        }
    }

    /// Start a mock user-search API. Returns the base URL and a hit counter.
    async fn start_users_api(mode: Mode) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/api/users", get(users_handler))
            .with_state(MockState {
                mode,
                hits: hits.clone(),
            });
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/api"), hits)
    }

    fn config(users_base: String, max_attempts: u32) -> HarvestConfig {
        HarvestConfig {
            users_base,
            workers: 2,
            retry: RetryPolicy::new(
                max_attempts,
                Duration::from_millis(1),
                Duration::from_millis(5),
            ),
        }
    }

    fn prefixes(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn prefixes_cover_aaa_to_zzz() {
        let all = name_prefixes();
        assert_eq!(all.len(), 26 * 26 * 26);
        assert_eq!(all.first().map(String::as_str), Some("aaa"));
        assert_eq!(all[1], "aab");
        assert_eq!(all.last().map(String::as_str), Some("zzz"));
        assert!(all.windows(2).all(|w| w[0] < w[1]), "sorted and unique");
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let ids = dedupe(prefixes(&["b", "a", "b", "c", "a"]));
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn collects_ids_in_prefix_order_without_repeats() {
        let (base, hits) = start_users_api(Mode::Echo).await;

        let report = harvest(
            reqwest::Client::new(),
            &config(base, 1),
            prefixes(&["abc", "abd", "abe"]),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(report.ids, vec!["U-abc", "U-shared", "U-abd", "U-abe"]);
        assert!(report.failed.is_empty());
        assert_eq!(report.skipped, 0);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rate_limited_prefix_is_retried() {
        let (base, hits) = start_users_api(Mode::LimitedOnce).await;

        let report = harvest(
            reqwest::Client::new(),
            &config(base, 3),
            prefixes(&["xyz"]),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(report.ids, vec!["U-xyz", "U-shared"]);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausted_prefix_is_reported_and_skipped() {
        let (base, hits) = start_users_api(Mode::Broken).await;

        let report = harvest(
            reqwest::Client::new(),
            &config(base, 3),
            prefixes(&["qqq"]),
            CancellationToken::new(),
        )
        .await;

        assert!(report.ids.is_empty());
        assert_eq!(report.failed, vec!["qqq"]);
        assert_eq!(hits.load(Ordering::SeqCst), 3, "bounded attempts");
    }

    #[tokio::test]
    async fn cancellation_during_backoff_is_skipped_not_failed() {
        let (base, hits) = start_users_api(Mode::Broken).await;
        let mut config = config(base, 5);
        config.retry = RetryPolicy::new(5, Duration::from_secs(30), Duration::from_secs(30));
        let cancel = CancellationToken::new();

        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            stopper.cancel();
        });

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            harvest(reqwest::Client::new(), &config, prefixes(&["qqq"]), cancel),
        )
        .await
        .expect("cancellation must cut the backoff short");

        assert!(report.failed.is_empty(), "got {:?}", report.failed);
        assert_eq!(report.skipped, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_sweep_skips_remaining_prefixes() {
        let (base, _hits) = start_users_api(Mode::Echo).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = harvest(
            reqwest::Client::new(),
            &config(base, 1),
            prefixes(&["aaa", "aab"]),
            cancel,
        )
        .await;

        assert!(report.ids.is_empty());
        assert_eq!(report.skipped, 2);
    }
}
