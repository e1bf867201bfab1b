//! Benchmark suite for the worker pool
//!
//! Measures end-to-end throughput: submit a batch of deposits to a started
//! bank and wait for an outcome event per deposit.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use std::sync::Arc;
use std::time::Duration;

use bank_engine::{Bank, BankConfig, ChannelObserver, Transaction};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

fn main() {
    divan::main();
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_time()
        .build()
        .expect("Failed to create runtime")
}

fn deposit_batch(workers: usize, transactions: usize) {
    let runtime = runtime();
    runtime.block_on(async {
        let bank = Bank::new(BankConfig::new(workers, Duration::from_millis(50)));
        let (sender, mut events) = mpsc::unbounded_channel();
        bank.register_observer(Arc::new(ChannelObserver::new(sender)));
        for id in 0..16 {
            bank.create_account(id, Decimal::ZERO, "USD")
                .expect("Failed to create account");
        }

        let running = bank.start().expect("Failed to start bank");
        for i in 0..transactions {
            bank.submit(Transaction::deposit((i % 16) as u32, Decimal::ONE));
        }
        for _ in 0..transactions {
            events.recv().await.expect("Event channel closed");
        }
        running.shutdown(Duration::from_secs(5)).await;
    });
}

/// 1,000 deposits across a single worker
#[divan::bench]
fn single_worker_1k() {
    deposit_batch(1, 1_000);
}

/// 1,000 deposits across the default pool
#[divan::bench]
fn default_pool_1k() {
    deposit_batch(BankConfig::default().workers, 1_000);
}

/// 10,000 deposits across the default pool
#[divan::bench]
fn default_pool_10k() {
    deposit_batch(BankConfig::default().workers, 10_000);
}

/// 10,000 deposits with one worker per CPU
#[divan::bench]
fn cpu_pool_10k() {
    deposit_batch(num_cpus::get(), 10_000);
}
