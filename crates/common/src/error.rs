//! Errors shared by the workspace binaries

use std::path::PathBuf;

use thiserror::Error;

/// Configuration and account-list failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Reading or writing an account list file failed
    #[error("account list {}: {source}", path.display())]
    AccountList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn account_list(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::AccountList {
            path: path.into(),
            source,
        }
    }
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;
