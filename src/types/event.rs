//! Outcome events and receipts
//!
//! Every processed transaction produces exactly one [`OutcomeEvent`], success
//! or failure. A successful execution also yields a [`Receipt`] describing the
//! committed state of the accounts it touched.

use super::account::Account;
use super::error::BankError;
use super::transaction::Transaction;
use rust_decimal::Decimal;

/// Committed result of one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    /// Account states right after the mutation, in the order the transaction
    /// names them (sender before receiver for transfers)
    pub accounts: Vec<Account>,

    /// Conversion rate applied, for exchanges and transfers
    pub rate: Option<Decimal>,

    /// Rate table generation the rate was read from
    pub rate_generation: Option<u64>,
}

impl Receipt {
    pub(crate) fn single(account: Account) -> Self {
        Receipt {
            accounts: vec![account],
            rate: None,
            rate_generation: None,
        }
    }

    pub(crate) fn converted(accounts: Vec<Account>, rate: Decimal, generation: u64) -> Self {
        Receipt {
            accounts,
            rate: Some(rate),
            rate_generation: Some(generation),
        }
    }
}

/// Human-readable notification emitted after a transaction attempt
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeEvent {
    pub message: String,
    pub succeeded: bool,
    /// The transaction that was attempted
    pub transaction: Transaction,
    /// Why the transaction failed, if it did
    pub error: Option<BankError>,
}

impl OutcomeEvent {
    /// Build the event for a transaction that committed
    pub fn success(transaction: Transaction, receipt: &Receipt) -> Self {
        let message = match (&transaction, receipt.accounts.as_slice()) {
            (Transaction::Deposit { account, amount }, [state, ..]) => format!(
                "Deposit: account {} deposited {}, balance {} {}",
                account, amount, state.balance, state.currency
            ),
            (Transaction::Withdraw { account, amount }, [state, ..]) => format!(
                "Withdrawal: account {} withdrew {}, balance {} {}",
                account, amount, state.balance, state.currency
            ),
            (Transaction::ExchangeCurrency { account, .. }, [state, ..]) => format!(
                "Exchange: account {} exchanged to {} {}",
                account, state.balance, state.currency
            ),
            (Transaction::Transfer { from, to, amount }, [sender, receiver, ..]) => format!(
                "Transfer: account {} transferred {} {} to account {}, balance {} {}",
                from, amount, sender.currency, to, receiver.balance, receiver.currency
            ),
            (tx, _) => format!("{}: completed", tx.kind()),
        };

        OutcomeEvent {
            message,
            succeeded: true,
            transaction,
            error: None,
        }
    }

    /// Build the event for a transaction that was rejected
    pub fn failure(transaction: Transaction, error: BankError) -> Self {
        let message = format!("{} failed: {}", transaction.kind(), error);
        OutcomeEvent {
            message,
            succeeded: false,
            transaction,
            error: Some(error),
        }
    }

    /// Build the event matching an execution result
    pub fn from_result(transaction: Transaction, result: &Result<Receipt, BankError>) -> Self {
        match result {
            Ok(receipt) => OutcomeEvent::success(transaction, receipt),
            Err(error) => OutcomeEvent::failure(transaction, error.clone()),
        }
    }
}
