//! Pipeline metrics
//!
//! Counters recorded through the `metrics` facade. Without an installed
//! recorder these calls are no-ops.
//!
//! - `meteor_scans_total` (counter): label `result`
//! - `meteor_items_discovered_total` (counter)
//! - `meteor_claims_total` (counter): label `outcome`

/// Record a finished scan: `ok` or the error kind.
pub fn record_scan(result: &str) {
    metrics::counter!("meteor_scans_total", "result" => result.to_string()).increment(1);
}

/// Record meteors discovered by one successful scan.
pub fn record_items_discovered(count: usize) {
    metrics::counter!("meteor_items_discovered_total").increment(count as u64);
}

/// Record a finished claim: the outcome label or the error kind.
pub fn record_claim(outcome: &str) {
    metrics::counter!("meteor_claims_total", "outcome" => outcome.to_string()).increment(1);
}
