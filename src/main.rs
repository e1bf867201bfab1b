//! Bank Engine demo CLI
//!
//! Seeds two accounts, starts the worker pool and the rate updater, submits a
//! short sequence of transactions, and shuts the engine down.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --workers 8 --rate-period-ms 250
//! RUST_LOG=debug cargo run
//! ```
//!
//! Each transaction is submitted only after the previous one's outcome event
//! arrives, so the final balances are deterministic apart from rate drift.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (runtime could not start, engine failed to start, etc.)

use std::process;
use std::sync::Arc;

use bank_engine::{
    cli, Bank, BankConfig, ChannelObserver, CurrencyCode, LoggingObserver, Transaction,
};
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = cli::parse_args();
    let config = args.to_bank_config();

    // at least one runtime thread per worker so the pool runs in parallel
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get().max(config.workers))
        .enable_time()
        .build()
        .map_err(|e| format!("Failed to create tokio runtime: {}", e));

    let result = runtime.and_then(|runtime| runtime.block_on(run(config)));
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(config: BankConfig) -> Result<(), String> {
    let shutdown_timeout = config.shutdown_timeout;
    let base = config.base_currency.clone();
    let bank = Bank::new(config);

    let (sender, mut events) = mpsc::unbounded_channel();
    bank.register_observer(Arc::new(LoggingObserver));
    bank.register_observer(Arc::new(ChannelObserver::new(sender)));

    let eur = CurrencyCode::new("EUR").map_err(|e| e.to_string())?;
    bank.create_account(1, Decimal::new(300, 0), base.as_str())
        .map_err(|e| e.to_string())?;
    bank.create_account(2, Decimal::new(500, 0), eur.as_str())
        .map_err(|e| e.to_string())?;
    if eur != base {
        bank.set_rate(eur.as_str(), Decimal::new(9, 1))
            .map_err(|e| e.to_string())?;
    }

    let running = bank.start().map_err(|e| e.to_string())?;

    let script = [
        Transaction::exchange(1, eur),
        Transaction::deposit(1, Decimal::new(500, 0)),
        Transaction::withdraw(1, Decimal::new(100, 0)),
        Transaction::withdraw(1, Decimal::new(10000, 0)),
        Transaction::transfer(1, 2, Decimal::new(300, 0)),
    ];
    for transaction in script {
        bank.submit(transaction);
        if events.recv().await.is_none() {
            break;
        }
    }

    let report = running.shutdown(shutdown_timeout).await;
    for account in bank.accounts() {
        tracing::info!(
            "Account {}: {} {}",
            account.id,
            account.balance,
            account.currency
        );
    }
    for (currency, rate) in bank.rates() {
        tracing::info!("Rate {}: {}", currency, rate);
    }

    if !report.drained {
        return Err(format!(
            "workers did not stop in time, {} transactions left",
            report.pending
        ));
    }
    Ok(())
}
