//! Bank Engine Library
//! # Overview
//!
//! This library simulates a bank's transaction-processing engine: client
//! operations are queued and executed by a fixed pool of concurrent workers
//! against shared account balances, while exchange rates drift in the
//! background.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, OutcomeEvent, etc.)
//! - [`config`] - Engine configuration
//! - [`bank`] - The `Bank` facade and its running handle
//! - [`cli`] - CLI arguments parsing for the demo binary
//! - [`core`] - Concurrent execution engine:
//!   - [`core::ledger`] - Account storage with per-account locks
//!   - [`core::rates`] - Rate table with consistent snapshots
//!   - [`core::rate_updater`] - Periodic rate drift
//!   - [`core::queue`] - Unbounded FIFO transaction queue
//!   - [`core::engine`] - Money-movement algorithms
//!   - [`core::worker_pool`] - Workers draining the queue
//!   - [`core::notification`] - Outcome fan-out to observers
//!
//! # Transaction Types
//!
//! - **Deposit**: Credit funds to an account
//! - **Withdraw**: Debit funds from an account (requires sufficient balance)
//! - **ExchangeCurrency**: Convert an account's whole balance to another currency
//! - **Transfer**: Move funds between accounts, converting at the current rate
//!
//! # Concurrency
//!
//! Each account has its own lock. Transfers lock both accounts in ascending
//! id order. Every operation reads the rates it needs from a single snapshot,
//! so it never mixes two rate updates. Every processed transaction yields
//! exactly one outcome event.

// Module declarations
pub mod bank;
pub mod cli;
pub mod config;
pub mod core;
pub mod types;

pub use bank::{Bank, RunningBank, ShutdownReport};
pub use config::BankConfig;
pub use core::{ChannelObserver, LoggingObserver, Observer};
pub use types::{
    Account, AccountId, BankError, CurrencyCode, ErrorKind, OutcomeEvent, Receipt, Transaction,
    TransactionKind,
};
