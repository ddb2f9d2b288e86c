//! Bounded FIFO queues shared by a worker pool
//!
//! tokio's `mpsc` receiver is single-consumer, so a pool shares it behind an
//! async mutex. Each job is still delivered to exactly one worker, in send
//! order.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

/// Receiving end shared by every worker of one pool.
pub(crate) type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<T>>>;

/// Create a queue of `capacity` with a shareable receiver.
pub(crate) fn bounded<T>(capacity: usize) -> (mpsc::Sender<T>, SharedReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, Arc::new(Mutex::new(rx)))
}

/// Wait for the next job. `None` once every sender is gone and the queue is
/// drained. Cancel-safe: dropping the future loses no job.
pub(crate) async fn next<T>(rx: &SharedReceiver<T>) -> Option<T> {
    rx.lock().await.recv().await
}
