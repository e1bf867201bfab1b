//! Account-related types for the bank engine
//!
//! This module defines the Account structure held by the ledger.

use super::currency::CurrencyCode;
use rust_decimal::Decimal;

/// Account identifier
pub type AccountId = u32;

/// Client account state
///
/// An account holds a single balance denominated in one currency. Exchanging
/// currency converts the whole balance and changes the account's currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Unique account identifier
    pub id: AccountId,

    /// Current balance
    ///
    /// Never negative after a committed operation.
    pub balance: Decimal,

    /// Currency the balance is denominated in
    pub currency: CurrencyCode,
}

impl Account {
    /// Create a new account with the given opening balance
    pub fn new(id: AccountId, balance: Decimal, currency: CurrencyCode) -> Self {
        Account {
            id,
            balance,
            currency,
        }
    }
}
