//! Scripted `Remote` for pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use meteor_api::{Error, Meteor, Outcome};

use crate::remote::{Remote, RemoteFuture};

/// Canned list answer for one account.
#[derive(Debug, Clone)]
pub enum ScanReply {
    Meteors(Vec<Meteor>),
    UserNotFound,
    DatabaseIssue,
    BadStatus(u16),
}

/// A remote whose answers are fixed up front and whose calls are recorded.
#[derive(Default)]
pub struct FakeRemote {
    scans: HashMap<String, ScanReply>,
    /// Result code per item id. Unlisted items answer `1` on the first claim
    /// and `0` afterwards, like the real service.
    mine_codes: HashMap<u64, i64>,
    scanned: Mutex<Vec<String>>,
    mined: Mutex<Vec<(String, u64)>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan(mut self, account: &str, reply: ScanReply) -> Self {
        self.scans.insert(account.to_string(), reply);
        self
    }

    pub fn with_meteors(self, account: &str, ids: &[u64]) -> Self {
        let meteors = ids
            .iter()
            .map(|&id| Meteor { id, nuggets: 1 })
            .collect();
        self.with_scan(account, ScanReply::Meteors(meteors))
    }

    pub fn with_mine_code(mut self, item_id: u64, code: i64) -> Self {
        self.mine_codes.insert(item_id, code);
        self
    }

    pub fn scanned(&self) -> Vec<String> {
        self.scanned.lock().unwrap().clone()
    }

    pub fn mined(&self) -> Vec<(String, u64)> {
        self.mined.lock().unwrap().clone()
    }
}

impl Remote for FakeRemote {
    fn fetch_items<'a>(&'a self, account: &'a str) -> RemoteFuture<'a, Vec<Meteor>> {
        self.scanned.lock().unwrap().push(account.to_string());
        let reply = self
            .scans
            .get(account)
            .cloned()
            .unwrap_or(ScanReply::UserNotFound);
        Box::pin(async move {
            match reply {
                ScanReply::Meteors(meteors) => Ok(meteors),
                ScanReply::UserNotFound => Err(Error::UserNotFound),
                ScanReply::DatabaseIssue => Err(Error::DatabaseIssue),
                ScanReply::BadStatus(code) => Err(Error::BadStatus(code)),
            }
        })
    }

    fn claim_item<'a>(&'a self, account: &'a str, item_id: u64) -> RemoteFuture<'a, Outcome> {
        let mut mined = self.mined.lock().unwrap();
        let claim = (account.to_string(), item_id);
        let repeat = mined.contains(&claim);
        mined.push(claim);
        drop(mined);
        let code = self
            .mine_codes
            .get(&item_id)
            .copied()
            .unwrap_or(if repeat { 0 } else { 1 });
        Box::pin(async move { Ok(Outcome::from_code(code)) })
    }
}
