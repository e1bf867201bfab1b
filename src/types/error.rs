//! Error types for the bank engine
//!
//! This module defines all error types that can occur while seeding the bank,
//! executing transactions, or starting the worker pool.
//!
//! # Error Categories
//!
//! - **Transaction Errors**: Unknown account or currency, invalid amount,
//!   insufficient funds. Workers recover from these locally and report them
//!   as failure events.
//! - **Arithmetic Errors**: Overflow while computing a new balance
//! - **Setup Errors**: Duplicate accounts, invalid rates or configuration,
//!   starting the engine twice. These abort the call that caused them.

use super::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Convenience alias used across the crate
pub type Result<T, E = BankError> = std::result::Result<T, E>;

/// Main error type for the bank engine
///
/// Each variant carries the identifiers needed to explain the failure in an
/// outcome event without access to the transaction that caused it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BankError {
    /// No account exists with the given id
    #[error("Unknown account {account}")]
    UnknownAccount {
        /// The account that was looked up
        account: AccountId,
    },

    /// A currency has no entry in the rate table
    #[error("Unknown currency {currency}")]
    UnknownCurrency {
        /// The currency that was looked up
        currency: String,
    },

    /// Amount is zero or negative
    #[error("Invalid amount {amount} for {operation}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Operation that received it
        operation: String,
    },

    /// Balance does not cover the requested debit
    ///
    /// The transaction is rejected and the account state remains unchanged.
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account being debited
        account: AccountId,
        /// Balance at the time of the check
        balance: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// Sender and receiver of a transfer are the same account
    #[error("Account {account} cannot transfer to itself")]
    SelfTransfer {
        /// The account on both sides of the transfer
        account: AccountId,
    },

    /// Computing the new balance would overflow
    ///
    /// The transaction is rejected to maintain account integrity.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account whose balance was being computed
        account: AccountId,
    },

    /// An account with this id has already been created
    #[error("Account {account} already exists")]
    DuplicateAccount {
        /// The duplicated id
        account: AccountId,
    },

    /// Text is not a valid currency code
    #[error("Invalid currency code '{code}'")]
    InvalidCurrency {
        /// The rejected text
        code: String,
    },

    /// Exchange rates must be strictly positive
    #[error("Invalid rate {rate} for currency {currency}")]
    InvalidRate {
        /// Currency being set
        currency: String,
        /// The rejected rate
        rate: Decimal,
    },

    /// The base currency's rate is fixed at 1.0
    #[error("Rate of base currency {currency} is fixed at 1")]
    BaseRateFixed {
        /// The base currency
        currency: String,
    },

    /// Engine configuration cannot be used to start
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// `start` was called on an engine that is already running
    #[error("Bank engine is already running")]
    AlreadyRunning,

    /// `start` was called outside a tokio runtime
    #[error("No tokio runtime available: {message}")]
    RuntimeUnavailable {
        /// Message reported by tokio
        message: String,
    },
}

/// Fieldless tag of a [`BankError`], convenient for matching outcome events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownAccount,
    UnknownCurrency,
    InvalidAmount,
    InsufficientFunds,
    SelfTransfer,
    ArithmeticOverflow,
    DuplicateAccount,
    InvalidCurrency,
    InvalidRate,
    BaseRateFixed,
    InvalidConfig,
    AlreadyRunning,
    RuntimeUnavailable,
}

// Helper functions for creating common errors

impl BankError {
    /// Create an UnknownAccount error
    pub fn unknown_account(account: AccountId) -> Self {
        BankError::UnknownAccount { account }
    }

    /// Create an UnknownCurrency error
    pub fn unknown_currency(currency: &str) -> Self {
        BankError::UnknownCurrency {
            currency: currency.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, operation: &str) -> Self {
        BankError::InvalidAmount {
            amount,
            operation: operation.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, balance: Decimal, requested: Decimal) -> Self {
        BankError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    /// Create a SelfTransfer error
    pub fn self_transfer(account: AccountId) -> Self {
        BankError::SelfTransfer { account }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        BankError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create a DuplicateAccount error
    pub fn duplicate_account(account: AccountId) -> Self {
        BankError::DuplicateAccount { account }
    }

    /// Create an InvalidCurrency error
    pub fn invalid_currency(code: &str) -> Self {
        BankError::InvalidCurrency {
            code: code.to_string(),
        }
    }

    /// Create an InvalidRate error
    pub fn invalid_rate(currency: &str, rate: Decimal) -> Self {
        BankError::InvalidRate {
            currency: currency.to_string(),
            rate,
        }
    }

    /// Create a BaseRateFixed error
    pub fn base_rate_fixed(currency: &str) -> Self {
        BankError::BaseRateFixed {
            currency: currency.to_string(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(message: &str) -> Self {
        BankError::InvalidConfig {
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BankError::UnknownAccount { .. } => ErrorKind::UnknownAccount,
            BankError::UnknownCurrency { .. } => ErrorKind::UnknownCurrency,
            BankError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            BankError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            BankError::SelfTransfer { .. } => ErrorKind::SelfTransfer,
            BankError::ArithmeticOverflow { .. } => ErrorKind::ArithmeticOverflow,
            BankError::DuplicateAccount { .. } => ErrorKind::DuplicateAccount,
            BankError::InvalidCurrency { .. } => ErrorKind::InvalidCurrency,
            BankError::InvalidRate { .. } => ErrorKind::InvalidRate,
            BankError::BaseRateFixed { .. } => ErrorKind::BaseRateFixed,
            BankError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            BankError::AlreadyRunning => ErrorKind::AlreadyRunning,
            BankError::RuntimeUnavailable { .. } => ErrorKind::RuntimeUnavailable,
        }
    }
}

impl From<tokio::runtime::TryCurrentError> for BankError {
    fn from(error: tokio::runtime::TryCurrentError) -> Self {
        BankError::RuntimeUnavailable {
            message: error.to_string(),
        }
    }
}
