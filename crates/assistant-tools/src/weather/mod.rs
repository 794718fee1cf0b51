//! Weather Sources
//!
//! Abstraction over current-conditions providers, with a wttr.in implementation.

pub mod mock;
mod wttr;

pub use mock::MockWeatherSource;
pub use wttr::WttrClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::WeatherReport;

/// Weather source trait (Strategy pattern)
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions for a free-form location
    async fn current(&self, location: &str) -> Result<WeatherReport>;

    fn name(&self) -> &str;
}
