//! Transaction execution engine
//!
//! This module provides the `TransactionEngine` struct, which implements the
//! four money-movement algorithms against the shared ledger and rate table.
//!
//! # Design
//!
//! The engine is stateless apart from its `Arc` handles, so it is cloned into
//! every worker. Each algorithm validates what it can up front, then performs
//! its read-modify-write inside a ledger lock scope. New balances are computed
//! with checked arithmetic before any field is written, so a rejected
//! transaction leaves every account exactly as it found it.
//!
//! # Architecture
//!
//! ```text
//! TransactionEngine
//!     ├── Arc<AccountLedger>  (per-account locks)
//!     └── Arc<RateTable>      (rate snapshots)
//! ```
//!
//! # Lock order
//!
//! Account locks are always taken before the rate table's read lock, and the
//! rate updater never touches account locks, so the two cannot deadlock.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::ledger::AccountLedger;
use super::rates::RateTable;
use crate::types::{AccountId, BankError, CurrencyCode, Receipt, Result, Transaction};

#[derive(Debug, Clone)]
pub struct TransactionEngine {
    ledger: Arc<AccountLedger>,
    rates: Arc<RateTable>,
}

impl TransactionEngine {
    pub fn new(ledger: Arc<AccountLedger>, rates: Arc<RateTable>) -> Self {
        Self { ledger, rates }
    }

    pub fn ledger(&self) -> &Arc<AccountLedger> {
        &self.ledger
    }

    pub fn rates(&self) -> &Arc<RateTable> {
        &self.rates
    }

    /// Execute a single transaction
    ///
    /// Routes the transaction to the algorithm for its kind.
    ///
    /// # Returns
    ///
    /// * `Ok(Receipt)` with the committed account states
    /// * `Err(BankError)` if the transaction was rejected; nothing was changed
    pub fn execute(&self, transaction: &Transaction) -> Result<Receipt> {
        match transaction {
            Transaction::Deposit { account, amount } => self.deposit(*account, *amount),
            Transaction::Withdraw { account, amount } => self.withdraw(*account, *amount),
            Transaction::ExchangeCurrency { account, target } => self.exchange(*account, target),
            Transaction::Transfer { from, to, amount } => self.transfer(*from, *to, *amount),
        }
    }

    /// Credit `amount` to an account
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount` is zero or negative
    /// * `UnknownAccount` if the account does not exist
    /// * `ArithmeticOverflow` if the new balance would overflow
    pub fn deposit(&self, account: AccountId, amount: Decimal) -> Result<Receipt> {
        ensure_positive(amount, "deposit")?;

        self.ledger.with_lock(account, |state| {
            state.balance = state
                .balance
                .checked_add(amount)
                .ok_or_else(|| BankError::arithmetic_overflow("deposit", account))?;
            Ok(Receipt::single(state.clone()))
        })
    }

    /// Debit `amount` from an account
    ///
    /// The balance check happens under the account lock, so concurrent
    /// withdrawals can never overdraw the account.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount` is zero or negative
    /// * `UnknownAccount` if the account does not exist
    /// * `InsufficientFunds` if the balance is lower than `amount`
    pub fn withdraw(&self, account: AccountId, amount: Decimal) -> Result<Receipt> {
        ensure_positive(amount, "withdrawal")?;

        self.ledger.with_lock(account, |state| {
            if state.balance < amount {
                return Err(BankError::insufficient_funds(
                    account,
                    state.balance,
                    amount,
                ));
            }
            state.balance -= amount;
            Ok(Receipt::single(state.clone()))
        })
    }

    /// Convert an account's whole balance into `target`
    ///
    /// `balance = balance * rate(target) / rate(current)` using one rate
    /// snapshot taken while the account is locked.
    ///
    /// # Errors
    ///
    /// * `UnknownAccount` if the account does not exist
    /// * `UnknownCurrency` if either currency has no rate
    /// * `ArithmeticOverflow` if the converted balance would overflow
    pub fn exchange(&self, account: AccountId, target: &CurrencyCode) -> Result<Receipt> {
        self.ledger.with_lock(account, |state| {
            let snapshot = self.rates.snapshot(&[&state.currency, target])?;
            let rate = snapshot.ratio(target, &state.currency)?;
            let converted = state
                .balance
                .checked_mul(rate)
                .ok_or_else(|| BankError::arithmetic_overflow("exchange", account))?;

            state.balance = converted;
            state.currency = target.clone();
            Ok(Receipt::converted(
                vec![state.clone()],
                rate,
                snapshot.generation(),
            ))
        })
    }

    /// Move `amount` from one account to another
    ///
    /// Both accounts are locked in ascending id order. The receiver is
    /// credited `amount * rate(sender) / rate(receiver)` using one rate
    /// snapshot.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount` is zero or negative
    /// * `SelfTransfer` if `from == to`
    /// * `UnknownAccount` if either account does not exist
    /// * `UnknownCurrency` if either account's currency has no rate
    /// * `InsufficientFunds` if the sender's balance is lower than `amount`
    /// * `ArithmeticOverflow` if the credited amount would overflow
    pub fn transfer(&self, from: AccountId, to: AccountId, amount: Decimal) -> Result<Receipt> {
        ensure_positive(amount, "transfer")?;
        if from == to {
            return Err(BankError::self_transfer(from));
        }

        self.ledger.with_locks(&[from, to], |locked| {
            let (sender, receiver) = locked.pair_mut(from, to)?;

            if sender.balance < amount {
                return Err(BankError::insufficient_funds(from, sender.balance, amount));
            }

            let snapshot = self
                .rates
                .snapshot(&[&sender.currency, &receiver.currency])?;
            let rate = snapshot.ratio(&sender.currency, &receiver.currency)?;
            let credited = amount
                .checked_mul(rate)
                .and_then(|value| receiver.balance.checked_add(value))
                .ok_or_else(|| BankError::arithmetic_overflow("transfer", to))?;

            sender.balance -= amount;
            receiver.balance = credited;
            Ok(Receipt::converted(
                vec![sender.clone(), receiver.clone()],
                rate,
                snapshot.generation(),
            ))
        })
    }
}

fn ensure_positive(amount: Decimal, operation: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(BankError::invalid_amount(amount, operation));
    }
    Ok(())
}
