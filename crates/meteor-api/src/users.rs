//! User search, used to harvest user ids by name prefix

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use serde::Deserialize;

use crate::client::endpoint;
use crate::error::{Error, Result};

/// Fallback wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct UserEntry {
    id: String,
}

/// Search users whose name matches `name` and return their ids.
///
/// A 429 maps to `Error::RateLimited` carrying the server's `Retry-After`
/// (seconds) so the caller can wait before asking again.
pub async fn search_users(
    client: &reqwest::Client,
    users_base: &str,
    name: &str,
) -> Result<Vec<String>> {
    let mut url = endpoint(users_base, &["users"])?;
    url.query_pairs_mut().append_pair("name", name);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Transport(format!("user search request failed: {e}")))?;

    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RETRY_AFTER);
        return Err(Error::RateLimited { retry_after });
    }
    if !status.is_success() {
        return Err(Error::BadStatus(status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::Transport(format!("failed to read user search response: {e}")))?;

    let entries: Vec<UserEntry> = serde_json::from_str(&body)
        .map_err(|e| Error::Protocol(format!("invalid user search response: {e}")))?;

    Ok(entries.into_iter().map(|entry| entry.id).collect())
}
