//! Mining (claiming) a single meteor
//!
//! The mine endpoint answers with a bare integer result code. Mining is not
//! idempotent from the caller's view: repeating a successful claim answers
//! `0`, which maps to `Outcome::AlreadyDone` rather than a failure.

use reqwest::header::USER_AGENT;
use tracing::{debug, warn};

use crate::client::{Client, endpoint};
use crate::error::{Error, Result};

/// Result of a mine request the service understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `1`: meteor claimed for the user
    Success,
    /// `0`: already claimed, typically by an earlier cycle
    AlreadyDone,
    /// `-1`: the service does not know this meteor
    UnknownItem,
    /// Any other code
    UnknownError(i64),
}

impl Outcome {
    /// Map a result code to an outcome.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Outcome::Success,
            0 => Outcome::AlreadyDone,
            -1 => Outcome::UnknownItem,
            other => Outcome::UnknownError(other),
        }
    }

    /// `Success` and `AlreadyDone` are both terminal non-failures.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Success | Outcome::AlreadyDone)
    }

    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::AlreadyDone => "already_done",
            Outcome::UnknownItem => "unknown_item",
            Outcome::UnknownError(_) => "unknown_error",
        }
    }
}

/// Interpret a 2xx mine body. A non-integer body is a protocol error and the
/// raw body is logged for diagnosis.
pub fn parse_mine_body(body: &str) -> Result<Outcome> {
    match body.parse::<i64>() {
        Ok(code) => Ok(Outcome::from_code(code)),
        Err(e) => {
            warn!(body, "mine response is not an integer");
            Err(Error::Protocol(format!(
                "mine response is not an integer ({e}): {body:?}"
            )))
        }
    }
}

impl Client {
    /// Attempt to mine meteor `meteor_id` for `user_id`. Exactly one request
    /// is sent; retries are the caller's decision.
    pub async fn mine_meteor(&self, user_id: &str, meteor_id: u64) -> Result<Outcome> {
        let id = meteor_id.to_string();
        let url = endpoint(&self.config.base_url, &["meteors", user_id, "mined", &id])?;
        debug!(account = user_id, item_id = meteor_id, %url, "mining meteor");

        let response = self
            .http
            .post(url)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .send()
            .await
            .map_err(|e| Error::Transport(format!("mine request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::BadStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read mine response: {e}")))?;

        parse_mine_body(&body)
    }
}
