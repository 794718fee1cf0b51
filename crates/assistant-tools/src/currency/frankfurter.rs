//! Frankfurter client (`api.frankfurter.app`, no API key).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::RateSource;
use crate::error::{check_status, http_client, Result, ServiceError};

const FRANKFURTER_API: &str = "https://api.frankfurter.app";
const SERVICE: &str = "Frankfurter";

pub struct FrankfurterClient {
    http: reqwest::Client,
    base_url: String,
}

impl FrankfurterClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: http_client(Duration::from_secs(10))?,
            base_url: FRANKFURTER_API.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatestRates {
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

impl LatestRates {
    /// The converted amount for `to`, which the API returns under `rates`
    pub(crate) fn converted(&self, to: &str) -> Result<Decimal> {
        self.rates
            .get(to)
            .copied()
            .ok_or_else(|| ServiceError::MissingRate(to.to_string()))
    }
}

#[async_trait]
impl RateSource for FrankfurterClient {
    async fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal> {
        tracing::debug!(%amount, from, to, "Frankfurter conversion");

        let url = format!("{}/latest", self.base_url.trim_end_matches('/'));
        let amount = amount.to_string();
        let response = self
            .http
            .get(url)
            .query(&[("from", from), ("to", to), ("amount", amount.as_str())])
            .send()
            .await?;

        let latest: LatestRates = check_status(SERVICE, response).await?.json().await?;
        latest.converted(to)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_converted_amount() {
        let latest: LatestRates =
            serde_json::from_str(r#"{"amount": 100.0, "base": "USD", "date": "2024-12-20", "rates": {"EUR": 92.5}}"#)
                .unwrap();
        assert_eq!(latest.converted("EUR").unwrap(), dec!(92.5));
    }

    #[test]
    fn test_missing_rate() {
        let latest: LatestRates = serde_json::from_str(r#"{"rates": {}}"#).unwrap();
        let err = latest.converted("XYZ").unwrap_err();
        assert_eq!(err.to_string(), "Could not find exchange rate for XYZ");
    }
}
