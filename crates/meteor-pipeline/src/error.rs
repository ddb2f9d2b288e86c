//! Startup errors for the pipeline
//!
//! These are the only fatal conditions. Per-job failures never surface as
//! `Error`; workers log them and move on.

/// Errors from pipeline construction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid worker pool size: {0}")]
    InvalidPoolSize(String),

    #[error("no accounts configured")]
    NoAccounts,

    #[error("scan period must be greater than 0")]
    ZeroScanPeriod,
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
