//! Mock Rate Source
//!
//! For testing and demo purposes. Static rates, counts every lookup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::RateSource;
use crate::error::{Result, ServiceError};

/// Mock rate source with fixed pair rates
#[derive(Default)]
pub struct MockRateSource {
    rates: HashMap<(String, String), Decimal>,
    calls: AtomicUsize,
}

impl MockRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.rates.insert((from.to_uppercase(), to.to_uppercase()), rate);
        self
    }

    /// Number of lookups served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for MockRateSource {
    async fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        self.rates
            .get(&(from.to_string(), to.to_string()))
            .map(|rate| amount * rate)
            .ok_or_else(|| ServiceError::MissingRate(to.to_string()))
    }

    fn name(&self) -> &str {
        "MockRates"
    }
}
