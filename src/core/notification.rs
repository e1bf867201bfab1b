//! Fan-out of outcome events to registered observers
//!
//! The bus keeps observers in registration order and delivers each event to
//! all of them synchronously on the notifying thread. Observers are called
//! without the registry lock held, so an observer may itself register more
//! observers. A panic inside one observer is caught and logged; delivery then
//! continues with the next observer.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;

use super::traits::Observer;
use crate::types::OutcomeEvent;

#[derive(Default)]
pub struct NotificationBus {
    observers: RwLock<Vec<Arc<dyn Observer>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer; it receives every event notified afterwards
    pub fn register(&self, observer: Arc<dyn Observer>) {
        self.observers.write().push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Deliver `event` to every observer in registration order
    ///
    /// Returns the number of observers that handled the event without
    /// panicking.
    pub fn notify(&self, event: &OutcomeEvent) -> usize {
        let observers: Vec<Arc<dyn Observer>> = self.observers.read().clone();
        let mut delivered = 0;

        for (index, observer) in observers.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| observer.update(event))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::warn!(
                        observer = index,
                        message = %event.message,
                        "Observer panicked while handling outcome event"
                    );
                }
            }
        }

        delivered
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Audit sink that writes every outcome through `tracing`
///
/// Successes are logged at `info`, failures at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl Observer for LoggingObserver {
    fn update(&self, event: &OutcomeEvent) {
        if event.succeeded {
            tracing::info!(kind = %event.transaction.kind(), "{}", event.message);
        } else {
            tracing::warn!(kind = %event.transaction.kind(), "{}", event.message);
        }
    }
}

/// Observer forwarding a copy of every event into a tokio channel
///
/// Useful for awaiting outcomes from async code. Events are dropped silently
/// once the receiving side is gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: UnboundedSender<OutcomeEvent>,
}

impl ChannelObserver {
    pub fn new(sender: UnboundedSender<OutcomeEvent>) -> Self {
        Self { sender }
    }
}

impl Observer for ChannelObserver {
    fn update(&self, event: &OutcomeEvent) {
        let _ = self.sender.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BankError, Transaction};
    use parking_lot::Mutex;
    use rust_decimal::Decimal;

    fn event() -> OutcomeEvent {
        OutcomeEvent::failure(
            Transaction::deposit(1, Decimal::ZERO),
            BankError::invalid_amount(Decimal::ZERO, "deposit"),
        )
    }

    #[test]
    fn test_notify_in_registration_order() {
        let bus = NotificationBus::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            bus.register(Arc::new(move |_: &OutcomeEvent| calls.lock().push(name)));
        }

        assert_eq!(bus.notify(&event()), 3);
        assert_eq!(*calls.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_panicking_observer_is_isolated() {
        let bus = NotificationBus::new();
        let received = Arc::new(Mutex::new(0));

        bus.register(Arc::new(|_: &OutcomeEvent| panic!("observer failure")));
        {
            let received = Arc::clone(&received);
            bus.register(Arc::new(move |_: &OutcomeEvent| *received.lock() += 1));
        }

        assert_eq!(bus.notify(&event()), 1);
        assert_eq!(bus.notify(&event()), 1);
        assert_eq!(*received.lock(), 2);
    }

    #[test]
    fn test_notify_without_observers() {
        let bus = NotificationBus::new();

        assert_eq!(bus.notify(&event()), 0);
    }

    #[test]
    fn test_observer_may_register_during_notify() {
        let bus = Arc::new(NotificationBus::new());
        {
            let inner = Arc::clone(&bus);
            bus.register(Arc::new(move |_: &OutcomeEvent| {
                inner.register(Arc::new(LoggingObserver));
            }));
        }

        bus.notify(&event());

        assert_eq!(bus.observer_count(), 2);
    }

    #[test]
    fn test_channel_observer_forwards_events() {
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        let bus = NotificationBus::new();
        bus.register(Arc::new(ChannelObserver::new(sender)));

        bus.notify(&event());

        assert_eq!(receiver.try_recv().unwrap(), event());
    }
}
