//! Engine configuration
//!
//! Controls the size of the worker pool, the rate drift, and how long a
//! shutdown waits for workers to drain the queue.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::core::DriftSettings;
use crate::types::{BankError, CurrencyCode, Result};

/// Configuration for a [`Bank`](crate::Bank)
#[derive(Clone, Debug, PartialEq)]
pub struct BankConfig {
    /// Number of concurrent workers
    pub workers: usize,
    /// Time between rate updates
    pub rate_update_period: Duration,
    /// Largest absolute rate change per update
    pub max_rate_delta: Decimal,
    /// Lowest value a drifting rate is clamped to
    pub rate_floor: Decimal,
    /// Currency whose rate is fixed at 1
    pub base_currency: CurrencyCode,
    /// How long shutdown waits for workers before aborting them
    pub shutdown_timeout: Duration,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            rate_update_period: Duration::from_secs(1),
            max_rate_delta: Decimal::new(20, 2),
            rate_floor: Decimal::new(1, 2),
            base_currency: CurrencyCode::from_static("USD"),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl BankConfig {
    /// Create a BankConfig with custom pool size and update period
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(workers: usize, rate_update_period: Duration) -> Self {
        let default = Self::default();

        let workers = if workers == 0 {
            tracing::warn!(
                "Invalid worker count ({}), using default ({})",
                workers,
                default.workers
            );
            default.workers
        } else {
            workers
        };

        let rate_update_period = if rate_update_period.is_zero() {
            tracing::warn!(
                "Invalid rate update period ({:?}), using default ({:?})",
                rate_update_period,
                default.rate_update_period
            );
            default.rate_update_period
        } else {
            rate_update_period
        };

        Self {
            workers,
            rate_update_period,
            ..default
        }
    }

    /// Check the configuration can start an engine
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(BankError::invalid_config("worker count must be at least 1"));
        }
        if self.rate_update_period.is_zero() {
            return Err(BankError::invalid_config(
                "rate update period must be non-zero",
            ));
        }
        if self.max_rate_delta < Decimal::ZERO {
            return Err(BankError::invalid_config("rate delta must not be negative"));
        }
        if self.rate_floor <= Decimal::ZERO {
            return Err(BankError::invalid_config("rate floor must be positive"));
        }
        Ok(())
    }

    pub fn drift(&self) -> DriftSettings {
        DriftSettings {
            period: self.rate_update_period,
            max_delta: self.max_rate_delta,
            floor: self.rate_floor,
        }
    }
}
