//! Command-line flags and account gathering

use clap::{ArgGroup, Parser};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

/// Mine meteors for a fixed set of users, rescanning every hour.
#[derive(Debug, Parser)]
#[command(name = "meteor-miner", version)]
#[command(group(ArgGroup::new("accounts").required(true).multiple(true).args(["users", "file"])))]
pub struct Cli {
    /// User id to mine meteors for (repeatable)
    #[arg(short = 'u', long = "user", value_name = "ID")]
    pub users: Vec<String>,

    /// Newline-delimited file of user ids to mine for
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// TOML config file (falls back to CONFIG_PATH, then meteor-miner.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Collect accounts from `-u` and `-f`, in that order, dropping blanks
    /// and repeats. An unreadable list file is logged and skipped.
    pub fn accounts(&self) -> Vec<String> {
        let mut accounts: Vec<String> = self
            .users
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        if let Some(path) = &self.file {
            info!(path = %path.display(), "reading user ids");
            match common::read_account_file(path) {
                Ok(from_file) => {
                    info!(path = %path.display(), count = from_file.len(), "read user ids");
                    accounts.extend(from_file);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "failed to read user id file"),
            }
        }

        let mut seen = HashSet::new();
        accounts.retain(|account| seen.insert(account.clone()));
        accounts
    }
}
