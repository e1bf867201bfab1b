//! Unbounded FIFO handoff between submitters and workers
//!
//! Submitters push into a tokio unbounded channel, which never blocks and
//! never rejects while the queue is alive. The single receiver sits behind an
//! async mutex so any number of workers can wait on it; whichever worker holds
//! the mutex takes the next item, which gives every dequeuer a distinct item
//! in enqueue order.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

use crate::types::Transaction;

#[derive(Debug)]
pub struct TransactionQueue {
    sender: UnboundedSender<Transaction>,
    receiver: Mutex<UnboundedReceiver<Transaction>>,
    pending: AtomicUsize,
}

impl TransactionQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            pending: AtomicUsize::new(0),
        }
    }

    /// Append a transaction; never blocks
    pub fn enqueue(&self, transaction: Transaction) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        // The queue owns both ends, so the channel cannot be closed here.
        if self.sender.send(transaction).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Wait for the next transaction
    ///
    /// Cancel safe: if the returned future is dropped before completing, no
    /// transaction is lost.
    pub async fn dequeue(&self) -> Option<Transaction> {
        let mut receiver = self.receiver.lock().await;
        let transaction = receiver.recv().await;
        if transaction.is_some() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
        transaction
    }

    /// Take the next transaction if one is immediately available
    pub async fn try_dequeue(&self) -> Option<Transaction> {
        let mut receiver = self.receiver.lock().await;
        let transaction = receiver.try_recv().ok();
        if transaction.is_some() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
        transaction
    }

    /// Transactions enqueued but not yet taken by a worker
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TransactionQueue {
    fn default() -> Self {
        Self::new()
    }
}
