//! Remote meteor API clients
//!
//! Two calls against the account service drive the miner:
//! 1. `Client::fetch_meteors()` lists the claimable meteors of one user
//! 2. `Client::mine_meteor()` claims a single meteor for that user
//!
//! A third call, `users::search_users()`, backs the user id harvester.
//! All calls share one immutable `ClientConfig` built at startup; there is
//! no process-wide client.

pub mod action;
pub mod catalog;
pub mod client;
pub mod constants;
pub mod error;
pub mod users;

pub use action::{Outcome, parse_mine_body};
pub use catalog::{Meteor, parse_catalog_body};
pub use client::{Client, ClientConfig};
pub use constants::*;
pub use error::{Error, Result};
pub use users::search_users;

#[cfg(test)]
pub(crate) mod mock;
