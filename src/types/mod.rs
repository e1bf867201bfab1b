//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account records and identifiers
//! - `currency`: Currency codes
//! - `transaction`: Transaction variants submitted by clients
//! - `event`: Outcome events delivered to observers
//! - `error`: Error types for the bank engine

pub mod account;
pub mod currency;
pub mod error;
pub mod event;
pub mod transaction;

pub use account::{Account, AccountId};
pub use currency::CurrencyCode;
pub use error::{BankError, ErrorKind, Result};
pub use event::{OutcomeEvent, Receipt};
pub use transaction::{Transaction, TransactionKind};
