//! Listing a user's claimable meteors
//!
//! The list endpoint overloads its success payload: a 200 body is either a
//! JSON object `{"meteors":[{"id":..,"nuggets":..}]}` or a bare integer error
//! sentinel. The service owns this convention, so parsing is explicitly
//! two-phase: try the integer first, and only when that fails parse JSON.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{Client, endpoint};
use crate::error::{Error, Result};

/// A claimable meteor as reported by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Meteor {
    pub id: u64,
    /// Reward quantity. Only counted and logged.
    pub nuggets: i64,
}

/// `null` for the whole body or for the list means no meteors.
#[derive(Debug, Deserialize)]
struct MeteorList {
    meteors: Option<Vec<Meteor>>,
}

/// Interpret a 2xx list body.
///
/// Sentinels: `-1` user not found, `-2` database issue, any other integer is
/// an unknown error. The integer probe is strict (no whitespace trimming), so
/// anything that is not exactly an integer goes to the JSON parser.
pub fn parse_catalog_body(body: &str) -> Result<Vec<Meteor>> {
    if let Ok(code) = body.parse::<i64>() {
        return Err(match code {
            -1 => Error::UserNotFound,
            -2 => Error::DatabaseIssue,
            other => Error::UnknownError(other),
        });
    }

    serde_json::from_str::<Option<MeteorList>>(body)
        .map(|list| list.and_then(|l| l.meteors).unwrap_or_default())
        .map_err(|e| Error::Protocol(format!("invalid meteor list: {e}")))
}

impl Client {
    /// Fetch the meteors currently claimable by `user_id`.
    pub async fn fetch_meteors(&self, user_id: &str) -> Result<Vec<Meteor>> {
        let url = endpoint(&self.config.base_url, &["meteors", user_id])?;
        debug!(account = user_id, %url, "listing meteors");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("meteor list request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::BadStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read meteor list: {e}")))?;

        parse_catalog_body(&body)
    }
}
