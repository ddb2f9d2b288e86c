//! Error taxonomy for remote meteor API calls

use std::time::Duration;

/// Errors from remote API calls.
///
/// `Transport`, `BadStatus` and `Protocol` describe what went wrong on the
/// wire. The remaining variants are domain answers the service encodes as
/// bare integer sentinels in an otherwise successful response.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("got bad status code {0}")]
    BadStatus(u16),

    #[error("unexpected response body: {0}")]
    Protocol(String),

    #[error("user not found")]
    UserNotFound,

    #[error("database issue")]
    DatabaseIssue,

    #[error("unknown error code {0}")]
    UnknownError(i64),

    #[error("rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },
}

impl Error {
    /// Stable label for structured logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Transport(_) => "transport_error",
            Error::BadStatus(_) => "bad_status",
            Error::Protocol(_) => "protocol_error",
            Error::UserNotFound => "user_not_found",
            Error::DatabaseIssue => "database_issue",
            Error::UnknownError(_) => "unknown_error",
            Error::RateLimited { .. } => "rate_limited",
        }
    }

    /// Whether repeating the same call could plausibly succeed.
    ///
    /// Domain answers are final for the current cycle and never transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::BadStatus(_) | Error::RateLimited { .. }
        )
    }
}

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;
