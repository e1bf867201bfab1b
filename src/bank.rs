//! Bank facade
//!
//! `Bank` owns the shared components and is the in-process API of the crate:
//! seeding accounts and rates, submitting transactions, registering
//! observers, and starting and stopping the background tasks.
//!
//! # Architecture
//!
//! ```text
//! Bank
//!     ├── Arc<AccountLedger>     (accounts, per-account locks)
//!     ├── Arc<RateTable>         (rates, consistent snapshots)
//!     ├── Arc<TransactionQueue>  (submit → workers)
//!     ├── Arc<NotificationBus>   (outcome events → observers)
//!     └── TransactionEngine      (money-movement algorithms)
//!
//! Bank::start() ──► RunningBank
//!                     ├── WorkerPool   (config.workers tasks)
//!                     ├── RateUpdater  (one periodic task)
//!                     └── CancellationToken
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::BankConfig;
use crate::core::worker_pool::process_transaction;
use crate::core::{
    AccountLedger, NotificationBus, Observer, RateTable, RateUpdater, TransactionEngine,
    TransactionQueue, WorkerPool,
};
use crate::types::{Account, AccountId, BankError, CurrencyCode, Receipt, Result, Transaction};

/// Concurrent transaction-processing engine
#[derive(Debug)]
pub struct Bank {
    config: BankConfig,
    ledger: Arc<AccountLedger>,
    rates: Arc<RateTable>,
    queue: Arc<TransactionQueue>,
    bus: Arc<NotificationBus>,
    engine: TransactionEngine,
    running: Arc<AtomicBool>,
}

/// Handle to the background tasks of a started [`Bank`]
///
/// Dropping the handle without calling [`RunningBank::shutdown`] leaves the
/// tasks running until the runtime itself shuts down.
#[derive(Debug)]
pub struct RunningBank {
    shutdown: CancellationToken,
    workers: WorkerPool,
    updater: JoinHandle<u64>,
    queue: Arc<TransactionQueue>,
    running: Arc<AtomicBool>,
}

/// Summary of a completed shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// True when every worker exited before the timeout
    pub drained: bool,
    /// Transactions processed by the workers over their lifetime
    pub processed: usize,
    /// Transactions left in the queue
    pub pending: usize,
    /// Rate update ticks applied
    pub rate_ticks: u64,
}

impl Bank {
    pub fn new(config: BankConfig) -> Self {
        let ledger = Arc::new(AccountLedger::new());
        let rates = Arc::new(RateTable::new(config.base_currency.clone()));
        let engine = TransactionEngine::new(Arc::clone(&ledger), Arc::clone(&rates));

        Self {
            config,
            ledger,
            rates,
            queue: Arc::new(TransactionQueue::new()),
            bus: Arc::new(NotificationBus::new()),
            engine,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Seed an account
    ///
    /// # Errors
    ///
    /// * `InvalidCurrency` if `currency` is not a valid code
    /// * `InvalidAmount` if `initial_balance` is negative
    /// * `DuplicateAccount` if `id` is taken
    pub fn create_account(
        &self,
        id: AccountId,
        initial_balance: Decimal,
        currency: &str,
    ) -> Result<()> {
        let currency = CurrencyCode::new(currency)?;
        self.ledger.create_account(id, initial_balance, currency)?;
        tracing::debug!(account = id, %initial_balance, "Account created");
        Ok(())
    }

    /// Insert or replace the rate of a currency relative to the base
    pub fn set_rate(&self, currency: &str, rate: Decimal) -> Result<()> {
        self.rates.set_rate(CurrencyCode::new(currency)?, rate)
    }

    /// Queue a transaction for the workers; never blocks
    pub fn submit(&self, transaction: Transaction) {
        self.queue.enqueue(transaction);
    }

    pub fn register_observer(&self, observer: Arc<dyn Observer>) {
        self.bus.register(observer);
    }

    /// Deposit immediately on the calling thread
    ///
    /// Runs the same algorithm as a worker and emits the same outcome event.
    pub fn deposit(&self, account: AccountId, amount: Decimal) -> Result<Receipt> {
        self.execute_now(Transaction::deposit(account, amount))
    }

    /// Withdraw immediately on the calling thread
    pub fn withdraw(&self, account: AccountId, amount: Decimal) -> Result<Receipt> {
        self.execute_now(Transaction::withdraw(account, amount))
    }

    /// Exchange an account's balance immediately on the calling thread
    pub fn exchange_currency(&self, account: AccountId, target: &str) -> Result<Receipt> {
        let target = CurrencyCode::new(target)?;
        self.execute_now(Transaction::exchange(account, target))
    }

    /// Transfer immediately on the calling thread
    pub fn transfer_funds(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<Receipt> {
        self.execute_now(Transaction::transfer(from, to, amount))
    }

    pub fn account(&self, id: AccountId) -> Option<Account> {
        self.ledger.get(id)
    }

    /// Snapshot of every account, sorted by id
    pub fn accounts(&self) -> Vec<Account> {
        self.ledger.accounts()
    }

    /// Snapshot of the rate table, sorted by currency
    pub fn rates(&self) -> Vec<(CurrencyCode, Decimal)> {
        self.rates.rates()
    }

    /// Transactions submitted but not yet taken by a worker
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the worker pool and the rate updater
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// * `AlreadyRunning` if a previous start has not been shut down
    /// * `InvalidConfig` if the configuration cannot start an engine
    /// * `RuntimeUnavailable` if no tokio runtime is active
    pub fn start(&self) -> Result<RunningBank> {
        self.config.validate()?;
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BankError::AlreadyRunning);
        }

        match self.spawn_tasks() {
            Ok(running) => {
                tracing::info!(
                    workers = self.config.workers,
                    base = %self.config.base_currency,
                    "Bank engine started"
                );
                Ok(running)
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    fn spawn_tasks(&self) -> Result<RunningBank> {
        let shutdown = CancellationToken::new();
        let updater = RateUpdater::spawn(
            Arc::clone(&self.rates),
            self.config.drift(),
            shutdown.clone(),
        )?;
        let workers = match WorkerPool::spawn(
            self.config.workers,
            self.engine.clone(),
            Arc::clone(&self.queue),
            Arc::clone(&self.bus),
            shutdown.clone(),
        ) {
            Ok(workers) => workers,
            Err(e) => {
                shutdown.cancel();
                return Err(e);
            }
        };

        Ok(RunningBank {
            shutdown,
            workers,
            updater,
            queue: Arc::clone(&self.queue),
            running: Arc::clone(&self.running),
        })
    }

    fn execute_now(&self, transaction: Transaction) -> Result<Receipt> {
        process_transaction(&self.engine, &self.bus, transaction)
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self::new(BankConfig::default())
    }
}

impl RunningBank {
    /// Stop the rate updater, let workers drain the queue, and wait for them
    ///
    /// Workers still running after `timeout` are aborted; whatever they had
    /// not yet dequeued stays in the queue and is reported as pending.
    pub async fn shutdown(self, timeout: Duration) -> ShutdownReport {
        tracing::info!(pending = self.queue.len(), "Shutting down bank engine");
        self.shutdown.cancel();

        let joined = self.workers.join(timeout).await;
        let rate_ticks = match self.updater.await {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::error!("Rate updater task failed: {}", e);
                0
            }
        };
        self.running.store(false, Ordering::SeqCst);

        let report = ShutdownReport {
            drained: joined.aborted == 0,
            processed: joined.processed,
            pending: self.queue.len(),
            rate_ticks,
        };
        tracing::info!(
            drained = report.drained,
            processed = report.processed,
            pending = report.pending,
            "Bank engine stopped"
        );
        report
    }

    pub fn worker_count(&self) -> usize {
        self.workers.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChannelObserver;
    use crate::types::{ErrorKind, OutcomeEvent};
    use tokio::sync::mpsc;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn seeded() -> Bank {
        let bank = Bank::default();
        bank.create_account(1, dec("300"), "USD").unwrap();
        bank.create_account(2, dec("500"), "EUR").unwrap();
        bank.set_rate("EUR", dec("0.9")).unwrap();
        bank
    }

    #[test]
    fn test_create_account_invalid_currency() {
        let bank = Bank::default();

        let result = bank.create_account(1, Decimal::ONE, "");

        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidCurrency);
        assert!(bank.accounts().is_empty());
    }

    #[test]
    fn test_direct_operations_emit_events() {
        let bank = seeded();
        let (sender, mut events) = mpsc::unbounded_channel();
        bank.register_observer(Arc::new(ChannelObserver::new(sender)));

        bank.exchange_currency(1, "EUR").unwrap();
        let failed = bank.withdraw(1, dec("10000"));

        assert!(failed.is_err());
        let first = events.try_recv().unwrap();
        let second = events.try_recv().unwrap();
        assert!(first.succeeded);
        assert!(first.message.contains("exchanged to 270"));
        assert!(!second.succeeded);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_start_outside_runtime() {
        let bank = seeded();

        let result = bank.start();

        assert_eq!(result.unwrap_err().kind(), ErrorKind::RuntimeUnavailable);
        assert!(!bank.is_running());
    }

    #[tokio::test]
    async fn test_start_with_invalid_config() {
        let bank = Bank::new(BankConfig {
            workers: 0,
            ..BankConfig::default()
        });

        assert_eq!(bank.start().unwrap_err().kind(), ErrorKind::InvalidConfig);
        assert!(!bank.is_running());
    }

    #[tokio::test]
    async fn test_start_twice_then_restart() {
        let bank = seeded();

        let running = bank.start().unwrap();
        assert_eq!(running.worker_count(), 5);
        assert_eq!(bank.start().unwrap_err(), BankError::AlreadyRunning);

        let report = running.shutdown(Duration::from_secs(1)).await;
        assert!(report.drained);
        assert!(!bank.is_running());

        let again = bank.start().unwrap();
        again.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_timeout_reports_committed_work() {
        let bank = Bank::new(BankConfig::new(1, Duration::from_secs(3600)));
        bank.create_account(1, Decimal::ZERO, "USD").unwrap();
        let (sender, mut events) = mpsc::unbounded_channel();
        bank.register_observer(Arc::new(ChannelObserver::new(sender)));
        bank.register_observer(Arc::new(|_: &OutcomeEvent| {
            std::thread::sleep(Duration::from_millis(20));
        }));
        for _ in 0..50 {
            bank.submit(Transaction::deposit(1, Decimal::ONE));
        }

        let running = bank.start().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let report = running.shutdown(Duration::from_millis(100)).await;

        let mut delivered = 0;
        while events.try_recv().is_ok() {
            delivered += 1;
        }
        assert!(!report.drained);
        assert!(report.processed > 0 && report.processed < 50);
        assert_eq!(report.processed, delivered);
        assert_eq!(report.pending, 50 - report.processed);
        assert_eq!(
            bank.account(1).unwrap().balance,
            Decimal::from(report.processed)
        );
        assert!(!bank.is_running());
    }

    #[tokio::test]
    async fn test_submit_before_start_is_processed() {
        let bank = seeded();
        bank.submit(Transaction::deposit(2, dec("100")));
        assert_eq!(bank.pending(), 1);

        let report = bank.start().unwrap().shutdown(Duration::from_secs(1)).await;

        assert_eq!(report.processed, 1);
        assert_eq!(report.pending, 0);
        assert_eq!(bank.account(2).unwrap().balance, dec("600"));
    }
}
