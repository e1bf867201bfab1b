//! Background drift of exchange rates
//!
//! The updater ticks on a fixed period independent of transaction load. Each
//! tick perturbs every non-base rate through [`RateTable::perturb`], which
//! holds the table's write lock for the whole tick. The updater never touches
//! the queue or any account lock.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::rates::RateTable;
use crate::types::{BankError, Result};

/// Parameters of the rate random walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftSettings {
    /// Time between ticks
    pub period: Duration,
    /// Largest absolute change per tick
    pub max_delta: Decimal,
    /// Lowest rate a currency may drift to
    pub floor: Decimal,
}

pub struct RateUpdater;

impl RateUpdater {
    /// Spawn the periodic updater on the current tokio runtime
    ///
    /// The first tick happens one `period` after spawning. The task resolves
    /// to the number of ticks applied once `shutdown` is cancelled.
    pub fn spawn(
        rates: Arc<RateTable>,
        settings: DriftSettings,
        shutdown: CancellationToken,
    ) -> Result<JoinHandle<u64>> {
        if settings.period.is_zero() {
            return Err(BankError::invalid_config(
                "rate update period must be non-zero",
            ));
        }
        if settings.floor <= Decimal::ZERO {
            return Err(BankError::invalid_config("rate floor must be positive"));
        }
        let runtime = tokio::runtime::Handle::try_current()?;
        Ok(runtime.spawn(run(rates, settings, shutdown)))
    }
}

async fn run(rates: Arc<RateTable>, settings: DriftSettings, shutdown: CancellationToken) -> u64 {
    let mut ticker = interval_at(Instant::now() + settings.period, settings.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut rng = StdRng::from_entropy();
    let mut ticks = 0;

    tracing::debug!(
        period_ms = settings.period.as_millis() as u64,
        "Rate updater started"
    );
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let generation = rates.perturb(&mut rng, settings.max_delta, settings.floor);
                ticks += 1;
                tracing::trace!(generation, "Exchange rates updated");
            }
        }
    }

    tracing::debug!(ticks, "Rate updater stopped");
    ticks
}
