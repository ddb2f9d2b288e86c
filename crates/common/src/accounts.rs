//! Account identifier list files
//!
//! Plain text, one identifier per line, no header. Lines are trimmed and blank
//! lines are skipped on read. The harvester writes this format and the miner
//! reads it back with `-f`.

use std::path::Path;

use crate::error::{Error, Result};

/// Parse a newline-delimited identifier list.
pub fn parse_account_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Read an identifier list file.
pub fn read_account_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::account_list(path, e))?;
    Ok(parse_account_list(&contents))
}

/// Write identifiers one per line, replacing any existing file.
pub fn write_account_file(path: &Path, accounts: &[String]) -> Result<()> {
    std::fs::write(path, accounts.join("\n")).map_err(|e| Error::account_list(path, e))
}
