//! Core business logic module
//!
//! This module contains the concurrent execution engine:
//! - `traits` - Observer capability for outcome notifications
//! - `ledger` - Account storage with per-account locking
//! - `rates` - Currency rate table with consistent snapshots
//! - `rate_updater` - Periodic background drift of rates
//! - `queue` - Unbounded FIFO transaction queue
//! - `notification` - Fan-out of outcome events to observers
//! - `engine` - Money-movement algorithms
//! - `worker_pool` - Fixed pool of workers draining the queue

pub mod engine;
pub mod ledger;
pub mod notification;
pub mod queue;
pub mod rate_updater;
pub mod rates;
pub mod traits;
pub mod worker_pool;

pub use engine::TransactionEngine;
pub use ledger::{AccountLedger, LockedAccounts};
pub use notification::{ChannelObserver, LoggingObserver, NotificationBus};
pub use queue::TransactionQueue;
pub use rate_updater::{DriftSettings, RateUpdater};
pub use rates::{RateSnapshot, RateTable};
pub use traits::Observer;
pub use worker_pool::{PoolJoin, WorkerPool};
