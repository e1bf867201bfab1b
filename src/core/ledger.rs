//! Thread-safe account ledger with per-account locking
//!
//! This module provides the `AccountLedger` struct, which owns every account
//! record and is the only place a balance may be read-modify-written.
//!
//! # Design
//!
//! Accounts live in a `DashMap` keyed by id, each behind its own
//! `parking_lot::Mutex`. The map is only used to find an account's mutex; the
//! shard guard is dropped before the account lock is taken, so a long mutation
//! on one account never blocks lookups of another.
//!
//! # Lock ordering
//!
//! Operations on several accounts go through [`AccountLedger::with_locks`],
//! which always acquires the mutexes in ascending id order and releases them
//! in reverse. Two transfers between the same pair of accounts in opposite
//! directions therefore request the locks in the same order and cannot
//! deadlock.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;

use crate::types::{Account, AccountId, BankError, CurrencyCode, Result};

/// Shared store of account records
#[derive(Debug, Default)]
pub struct AccountLedger {
    accounts: DashMap<AccountId, Arc<Mutex<Account>>>,
}

/// Exclusive access to a set of accounts, held for the duration of a
/// [`AccountLedger::with_locks`] closure
///
/// Guards are stored in acquisition (ascending id) order.
pub struct LockedAccounts<'a> {
    guards: Vec<MutexGuard<'a, Account>>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Seed a new account
    ///
    /// # Errors
    ///
    /// * `DuplicateAccount` if the id is taken
    /// * `InvalidAmount` if the opening balance is negative
    pub fn create_account(
        &self,
        id: AccountId,
        balance: Decimal,
        currency: CurrencyCode,
    ) -> Result<()> {
        if balance < Decimal::ZERO {
            return Err(BankError::invalid_amount(balance, "account creation"));
        }

        match self.accounts.entry(id) {
            Entry::Occupied(_) => Err(BankError::duplicate_account(id)),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(Account::new(id, balance, currency))));
                Ok(())
            }
        }
    }

    /// Snapshot of an account
    ///
    /// The returned value is a copy; it may be stale as soon as it is
    /// returned if workers are running.
    pub fn get(&self, id: AccountId) -> Option<Account> {
        let handle = self.handle(id)?;
        let account = handle.lock().clone();
        Some(account)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Run `f` while holding the exclusive lock of one account
    ///
    /// The lock is released when `f` returns, whether it succeeded or not.
    pub fn with_lock<T, F>(&self, id: AccountId, f: F) -> Result<T>
    where
        F: FnOnce(&mut Account) -> Result<T>,
    {
        let handle = self.lookup(id)?;
        let mut guard = handle.lock();
        f(&mut guard)
    }

    /// Run `f` while holding the locks of every listed account
    ///
    /// Ids are sorted and de-duplicated, every account is resolved before any
    /// lock is taken, and the locks are acquired in ascending id order.
    pub fn with_locks<T, F>(&self, ids: &[AccountId], f: F) -> Result<T>
    where
        F: FnOnce(&mut LockedAccounts<'_>) -> Result<T>,
    {
        let mut ordered = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let handles = ordered
            .iter()
            .map(|&id| self.lookup(id))
            .collect::<Result<Vec<_>>>()?;

        let mut locked = LockedAccounts {
            guards: handles.iter().map(|handle| handle.lock()).collect(),
        };
        f(&mut locked)
    }

    /// Snapshot of all accounts, sorted by id
    pub fn accounts(&self) -> Vec<Account> {
        let handles: Vec<_> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut accounts: Vec<Account> = handles.iter().map(|h| h.lock().clone()).collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    fn handle(&self, id: AccountId) -> Option<Arc<Mutex<Account>>> {
        self.accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn lookup(&self, id: AccountId) -> Result<Arc<Mutex<Account>>> {
        self.handle(id).ok_or(BankError::unknown_account(id))
    }
}

impl LockedAccounts<'_> {
    /// Ids of the locked accounts in acquisition order
    pub fn ids(&self) -> Vec<AccountId> {
        self.guards.iter().map(|guard| guard.id).collect()
    }

    /// Mutable access to two distinct locked accounts at once
    pub fn pair_mut(
        &mut self,
        first: AccountId,
        second: AccountId,
    ) -> Result<(&mut Account, &mut Account)> {
        if first == second {
            return Err(BankError::self_transfer(first));
        }
        let i = self.position(first)?;
        let j = self.position(second)?;

        if i < j {
            let (low, high) = self.guards.split_at_mut(j);
            Ok((&mut *low[i], &mut *high[0]))
        } else {
            let (low, high) = self.guards.split_at_mut(i);
            Ok((&mut *high[0], &mut *low[j]))
        }
    }

    fn position(&self, id: AccountId) -> Result<usize> {
        self.guards
            .iter()
            .position(|guard| guard.id == id)
            .ok_or_else(|| BankError::unknown_account(id))
    }
}

impl Drop for LockedAccounts<'_> {
    fn drop(&mut self) {
        // release in reverse acquisition order
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}
