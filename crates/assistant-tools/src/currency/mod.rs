//! Exchange Rate Sources
//!
//! Abstraction over currency conversion services, with a Frankfurter
//! (European Central Bank reference rates) implementation.

mod frankfurter;
pub mod mock;

pub use frankfurter::FrankfurterClient;
pub use mock::MockRateSource;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;

/// Rate source trait (Strategy pattern)
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Convert `amount` of `from` into `to`; codes are upper-case ISO 4217
    async fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal>;

    fn name(&self) -> &str;
}

/// Whether `code` looks like an ISO 4217 code (three ASCII letters, any case)
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}
