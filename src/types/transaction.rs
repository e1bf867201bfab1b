//! Transaction-related types for the bank engine
//!
//! This module defines the transaction variants clients submit to the queue.
//! A transaction is an immutable value: it is created by a submitter, consumed
//! exactly once by one worker, and then discarded.

use super::account::AccountId;
use super::currency::CurrencyCode;
use rust_decimal::Decimal;
use std::fmt;

/// Operations a client can request
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    /// Credit funds to an account
    Deposit { account: AccountId, amount: Decimal },

    /// Debit funds from an account
    ///
    /// Requires the balance to cover the amount.
    Withdraw { account: AccountId, amount: Decimal },

    /// Convert the whole balance of an account into another currency
    ExchangeCurrency {
        account: AccountId,
        target: CurrencyCode,
    },

    /// Move funds between two accounts
    ///
    /// `amount` is denominated in the sender's currency; the receiver is
    /// credited `amount * rate(sender) / rate(receiver)`.
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },
}

/// Discriminant of a [`Transaction`], used in messages and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    ExchangeCurrency,
    Transfer,
}

impl Transaction {
    pub fn deposit(account: AccountId, amount: Decimal) -> Self {
        Transaction::Deposit { account, amount }
    }

    pub fn withdraw(account: AccountId, amount: Decimal) -> Self {
        Transaction::Withdraw { account, amount }
    }

    pub fn exchange(account: AccountId, target: CurrencyCode) -> Self {
        Transaction::ExchangeCurrency { account, target }
    }

    pub fn transfer(from: AccountId, to: AccountId, amount: Decimal) -> Self {
        Transaction::Transfer { from, to, amount }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Deposit { .. } => TransactionKind::Deposit,
            Transaction::Withdraw { .. } => TransactionKind::Withdraw,
            Transaction::ExchangeCurrency { .. } => TransactionKind::ExchangeCurrency,
            Transaction::Transfer { .. } => TransactionKind::Transfer,
        }
    }

    /// Accounts this transaction touches, in the order they appear
    pub fn accounts(&self) -> Vec<AccountId> {
        match self {
            Transaction::Deposit { account, .. }
            | Transaction::Withdraw { account, .. }
            | Transaction::ExchangeCurrency { account, .. } => vec![*account],
            Transaction::Transfer { from, to, .. } => vec![*from, *to],
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdrawal",
            TransactionKind::ExchangeCurrency => "exchange",
            TransactionKind::Transfer => "transfer",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::deposit(Transaction::deposit(1, Decimal::ONE), TransactionKind::Deposit, vec![1])]
    #[case::withdraw(Transaction::withdraw(2, Decimal::ONE), TransactionKind::Withdraw, vec![2])]
    #[case::exchange(
        Transaction::exchange(3, CurrencyCode::new("EUR").unwrap()),
        TransactionKind::ExchangeCurrency,
        vec![3]
    )]
    #[case::transfer(Transaction::transfer(5, 4, Decimal::ONE), TransactionKind::Transfer, vec![5, 4])]
    fn test_kind_and_accounts(
        #[case] tx: Transaction,
        #[case] kind: TransactionKind,
        #[case] accounts: Vec<AccountId>,
    ) {
        assert_eq!(tx.kind(), kind);
        assert_eq!(tx.accounts(), accounts);
    }
}
