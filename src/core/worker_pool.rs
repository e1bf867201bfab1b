//! Fixed pool of workers draining the transaction queue
//!
//! This module provides the `WorkerPool` struct, which spawns a fixed number
//! of tokio tasks sharing one [`TransactionEngine`], one [`TransactionQueue`]
//! and one [`NotificationBus`].
//!
//! # Worker loop
//!
//! ```text
//! loop:
//!     dequeue ──► engine.execute ──► OutcomeEvent ──► bus.notify
//! ```
//!
//! Each dequeued transaction is attempted exactly once. Rejections become
//! failure events and the worker moves on; nothing is retried or re-enqueued.
//!
//! # Shutdown
//!
//! When the shared `CancellationToken` fires, a worker stops waiting on the
//! queue and processes whatever is still enqueued without blocking, then
//! exits. [`WorkerPool::join`] waits for that drain up to a deadline and
//! aborts workers that miss it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::engine::TransactionEngine;
use super::notification::NotificationBus;
use super::queue::TransactionQueue;
use crate::types::{BankError, OutcomeEvent, Receipt, Result, Transaction};

/// Handles of running worker tasks
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    processed: Arc<AtomicUsize>,
}

/// Result of waiting for the pool to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolJoin {
    /// Transactions processed by all workers, aborted ones included
    pub processed: usize,
    /// Workers aborted because the deadline passed
    pub aborted: usize,
}

impl WorkerPool {
    /// Spawn `workers` tasks on the current tokio runtime
    ///
    /// # Errors
    ///
    /// * `InvalidConfig` if `workers` is zero
    /// * `RuntimeUnavailable` if called outside a tokio runtime
    pub fn spawn(
        workers: usize,
        engine: TransactionEngine,
        queue: Arc<TransactionQueue>,
        bus: Arc<NotificationBus>,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        if workers == 0 {
            return Err(BankError::invalid_config("worker count must be at least 1"));
        }
        let runtime = tokio::runtime::Handle::try_current()?;
        let processed = Arc::new(AtomicUsize::new(0));

        let handles = (1..=workers)
            .map(|id| {
                runtime.spawn(run_worker(
                    id,
                    engine.clone(),
                    Arc::clone(&queue),
                    Arc::clone(&bus),
                    Arc::clone(&processed),
                    shutdown.clone(),
                ))
            })
            .collect();

        tracing::info!(workers, "Worker pool started");
        Ok(Self { handles, processed })
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to exit, aborting those still running after
    /// `timeout`
    ///
    /// Workers only exit once the shutdown token has been cancelled. An
    /// aborted worker stops at its next await point, after finishing the
    /// transaction it is executing; `join` waits for that before counting.
    pub async fn join(self, timeout: Duration) -> PoolJoin {
        let deadline = Instant::now() + timeout;
        let mut aborted = 0;

        for mut handle in self.handles {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Worker task failed: {}", e),
                Err(_) => {
                    handle.abort();
                    if let Err(e) = handle.await {
                        if !e.is_cancelled() {
                            tracing::error!("Worker task failed: {}", e);
                        }
                    }
                    aborted += 1;
                }
            }
        }

        if aborted > 0 {
            tracing::warn!(
                aborted,
                "Workers did not drain the queue before the deadline"
            );
        }
        PoolJoin {
            processed: self.processed.load(Ordering::SeqCst),
            aborted,
        }
    }
}

/// Execute one transaction and publish its outcome
///
/// Shared by the worker loop and the bank's direct operations so both emit
/// exactly one event per attempt.
pub(crate) fn process_transaction(
    engine: &TransactionEngine,
    bus: &NotificationBus,
    transaction: Transaction,
) -> Result<Receipt> {
    let result = engine.execute(&transaction);
    let event = OutcomeEvent::from_result(transaction, &result);
    tracing::debug!(succeeded = event.succeeded, "{}", event.message);
    bus.notify(&event);
    result
}

async fn run_worker(
    id: usize,
    engine: TransactionEngine,
    queue: Arc<TransactionQueue>,
    bus: Arc<NotificationBus>,
    total: Arc<AtomicUsize>,
    shutdown: CancellationToken,
) {
    tracing::debug!(worker = id, "Worker started");
    let mut processed = 0;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = queue.dequeue() => match next {
                Some(transaction) => {
                    let _ = process_transaction(&engine, &bus, transaction);
                    total.fetch_add(1, Ordering::SeqCst);
                    processed += 1;
                }
                None => break,
            },
        }
    }

    while let Some(transaction) = queue.try_dequeue().await {
        let _ = process_transaction(&engine, &bus, transaction);
        total.fetch_add(1, Ordering::SeqCst);
        processed += 1;
        // lets an abort from `join` land between transactions
        tokio::task::yield_now().await;
    }

    tracing::debug!(worker = id, processed, "Worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notification::ChannelObserver;
    use crate::core::{AccountLedger, RateTable};
    use crate::types::{CurrencyCode, ErrorKind};
    use rust_decimal::Decimal;
    use tokio::sync::mpsc;

    struct Harness {
        engine: TransactionEngine,
        queue: Arc<TransactionQueue>,
        bus: Arc<NotificationBus>,
        events: mpsc::UnboundedReceiver<OutcomeEvent>,
    }

    fn harness() -> Harness {
        let usd = CurrencyCode::new("USD").unwrap();
        let ledger = Arc::new(AccountLedger::new());
        ledger
            .create_account(1, Decimal::new(100, 0), usd.clone())
            .unwrap();
        let engine = TransactionEngine::new(ledger, Arc::new(RateTable::new(usd)));
        let bus = Arc::new(NotificationBus::new());
        let (sender, events) = mpsc::unbounded_channel();
        bus.register(Arc::new(ChannelObserver::new(sender)));
        Harness {
            engine,
            queue: Arc::new(TransactionQueue::new()),
            bus,
            events,
        }
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let h = harness();

        let result = WorkerPool::spawn(2, h.engine, h.queue, h.bus, CancellationToken::new());

        assert_eq!(result.unwrap_err().kind(), ErrorKind::RuntimeUnavailable);
    }

    #[tokio::test]
    async fn test_spawn_zero_workers_fails() {
        let h = harness();

        let result = WorkerPool::spawn(0, h.engine, h.queue, h.bus, CancellationToken::new());

        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidConfig);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failure_does_not_stop_worker() {
        let mut h = harness();
        let token = CancellationToken::new();
        let pool = WorkerPool::spawn(
            1,
            h.engine.clone(),
            Arc::clone(&h.queue),
            Arc::clone(&h.bus),
            token.clone(),
        )
        .unwrap();

        h.queue.enqueue(Transaction::withdraw(1, Decimal::new(500, 0)));
        h.queue.enqueue(Transaction::deposit(1, Decimal::new(5, 0)));

        let first = h.events.recv().await.unwrap();
        let second = h.events.recv().await.unwrap();
        assert!(!first.succeeded);
        assert_eq!(
            first.error.map(|e| e.kind()),
            Some(ErrorKind::InsufficientFunds)
        );
        assert!(second.succeeded);
        assert_eq!(
            h.engine.ledger().get(1).unwrap().balance,
            Decimal::new(105, 0)
        );

        token.cancel();
        let joined = pool.join(Duration::from_secs(5)).await;
        assert_eq!(
            joined,
            PoolJoin {
                processed: 2,
                aborted: 0
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_drains_queue() {
        let mut h = harness();
        let token = CancellationToken::new();

        // cancel before any worker starts so everything goes through the drain
        token.cancel();
        for _ in 0..50 {
            h.queue.enqueue(Transaction::deposit(1, Decimal::ONE));
        }
        let pool = WorkerPool::spawn(
            3,
            h.engine.clone(),
            Arc::clone(&h.queue),
            Arc::clone(&h.bus),
            token,
        )
        .unwrap();

        let joined = pool.join(Duration::from_secs(5)).await;

        assert_eq!(joined.processed, 50);
        assert_eq!(joined.aborted, 0);
        assert!(h.queue.is_empty());
        assert_eq!(
            h.engine.ledger().get(1).unwrap().balance,
            Decimal::new(150, 0)
        );
        let mut events = 0;
        while h.events.try_recv().is_ok() {
            events += 1;
        }
        assert_eq!(events, 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_join_aborts_after_deadline() {
        let h = harness();
        let token = CancellationToken::new();
        let pool = WorkerPool::spawn(2, h.engine, h.queue, h.bus, token)
            .unwrap();

        // token never cancelled: workers keep waiting on the empty queue
        let joined = pool.join(Duration::from_millis(50)).await;

        assert_eq!(
            joined,
            PoolJoin {
                processed: 0,
                aborted: 2
            }
        );
    }
}
