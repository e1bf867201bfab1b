//! Core traits for the bank engine
//!
//! This module defines the seams where callers plug their own behaviour into
//! the engine.

use crate::types::OutcomeEvent;

/// Receiver of outcome events
///
/// Observers are registered on a [`NotificationBus`](super::NotificationBus)
/// and called synchronously from whichever worker processed the transaction,
/// so implementations must be cheap and thread-safe. A panicking observer is
/// isolated by the bus and does not affect other observers or the worker.
pub trait Observer: Send + Sync {
    /// Handle one outcome event
    fn update(&self, event: &OutcomeEvent);
}

impl<F> Observer for F
where
    F: Fn(&OutcomeEvent) + Send + Sync,
{
    fn update(&self, event: &OutcomeEvent) {
        self(event)
    }
}
