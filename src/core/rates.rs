//! Currency rate table
//!
//! Rates are expressed relative to a base currency whose rate is fixed at 1.
//! The whole table sits behind a single `RwLock` together with a generation
//! counter: an update tick rewrites every rate under one write lock and bumps
//! the generation, and a snapshot copies the requested rates under one read
//! lock. A reader therefore sees either all of a tick's changes or none.

use std::collections::HashMap;

use parking_lot::RwLock;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::types::{BankError, CurrencyCode, Result};

#[derive(Debug)]
struct RateState {
    rates: HashMap<CurrencyCode, Decimal>,
    generation: u64,
}

/// Shared currency → rate mapping
#[derive(Debug)]
pub struct RateTable {
    base: CurrencyCode,
    state: RwLock<RateState>,
}

/// Consistent set of rates read at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    rates: HashMap<CurrencyCode, Decimal>,
    generation: u64,
}

impl RateTable {
    /// Create a table containing only the base currency at rate 1
    pub fn new(base: CurrencyCode) -> Self {
        let mut rates = HashMap::new();
        rates.insert(base.clone(), Decimal::ONE);
        Self {
            base,
            state: RwLock::new(RateState {
                rates,
                generation: 0,
            }),
        }
    }

    /// Insert or replace the rate of a currency
    ///
    /// # Errors
    ///
    /// * `InvalidRate` if `rate` is not strictly positive
    /// * `BaseRateFixed` if `currency` is the base and `rate` is not 1
    pub fn set_rate(&self, currency: CurrencyCode, rate: Decimal) -> Result<()> {
        if rate <= Decimal::ZERO {
            return Err(BankError::invalid_rate(currency.as_str(), rate));
        }
        if currency == self.base && rate != Decimal::ONE {
            return Err(BankError::base_rate_fixed(currency.as_str()));
        }
        self.state.write().rates.insert(currency, rate);
        Ok(())
    }

    pub fn get(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.state.read().rates.get(currency).copied()
    }

    /// Number of completed update ticks
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Read the rates of `currencies` as of one instant
    ///
    /// Fails with `UnknownCurrency` naming the first missing currency.
    pub fn snapshot(&self, currencies: &[&CurrencyCode]) -> Result<RateSnapshot> {
        let state = self.state.read();
        let mut rates = HashMap::with_capacity(currencies.len());
        for &currency in currencies {
            let rate = state
                .rates
                .get(currency)
                .ok_or_else(|| BankError::unknown_currency(currency.as_str()))?;
            rates.insert(currency.clone(), *rate);
        }
        Ok(RateSnapshot {
            rates,
            generation: state.generation,
        })
    }

    /// Copy of the full table, sorted by currency code
    pub fn rates(&self) -> Vec<(CurrencyCode, Decimal)> {
        let mut rates: Vec<_> = self
            .state
            .read()
            .rates
            .iter()
            .map(|(code, rate)| (code.clone(), *rate))
            .collect();
        rates.sort_by(|a, b| a.0.cmp(&b.0));
        rates
    }

    /// Apply one update tick
    ///
    /// Every non-base rate gets a random delta drawn uniformly from
    /// `[-max_delta, +max_delta]` in whole hundredths (`max_delta` is truncated
    /// to hundredths), and is then clamped to at least `floor`. All rates
    /// change under one write lock. Returns the new generation.
    pub fn perturb<R: Rng>(&self, rng: &mut R, max_delta: Decimal, floor: Decimal) -> u64 {
        let steps = (max_delta.abs() * Decimal::ONE_HUNDRED)
            .trunc()
            .to_i64()
            .unwrap_or(0);

        let mut state = self.state.write();
        for (currency, rate) in state.rates.iter_mut() {
            if *currency == self.base {
                continue;
            }
            let delta = Decimal::new(rng.gen_range(-steps..=steps), 2);
            let next = rate.checked_add(delta).unwrap_or(*rate);
            *rate = next.max(floor);
        }
        state.generation += 1;
        state.generation
    }
}

impl RateSnapshot {
    /// Generation of the table this snapshot was read from
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rate(&self, currency: &CurrencyCode) -> Result<Decimal> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| BankError::unknown_currency(currency.as_str()))
    }

    /// `rate(numerator) / rate(denominator)`
    pub fn ratio(&self, numerator: &CurrencyCode, denominator: &CurrencyCode) -> Result<Decimal> {
        let top = self.rate(numerator)?;
        let bottom = self.rate(denominator)?;
        top.checked_div(bottom)
            .ok_or_else(|| BankError::invalid_rate(denominator.as_str(), bottom))
    }
}
