//! Common types for the meteor miner workspace

mod accounts;
mod error;

pub use accounts::{parse_account_list, read_account_file, write_account_file};
pub use error::{Error, Result};
