//! Remote seam between the workers and the meteor API
//!
//! Workers only see this trait, so pools can be driven by a scripted fake in
//! tests. `meteor_api::Client` is the production implementation.
//!
//! Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn Remote>`).

use std::future::Future;
use std::pin::Pin;

use meteor_api::{Meteor, Outcome};

/// Boxed future returned by `Remote` methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = meteor_api::Result<T>> + Send + 'a>>;

/// The two remote calls the pipeline makes.
pub trait Remote: Send + Sync {
    /// List the meteors currently claimable by `account`.
    fn fetch_items<'a>(&'a self, account: &'a str) -> RemoteFuture<'a, Vec<Meteor>>;

    /// Mine meteor `item_id` for `account`.
    fn claim_item<'a>(&'a self, account: &'a str, item_id: u64) -> RemoteFuture<'a, Outcome>;
}

impl Remote for meteor_api::Client {
    fn fetch_items<'a>(&'a self, account: &'a str) -> RemoteFuture<'a, Vec<Meteor>> {
        Box::pin(self.fetch_meteors(account))
    }

    fn claim_item<'a>(&'a self, account: &'a str, item_id: u64) -> RemoteFuture<'a, Outcome> {
        Box::pin(self.mine_meteor(account, item_id))
    }
}
