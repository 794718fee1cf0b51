//! Mock Weather Source
//!
//! For testing and demo purposes. Returns fixed conditions for known cities.

use std::collections::HashMap;

use async_trait::async_trait;

use super::WeatherSource;
use crate::error::{Result, ServiceError};
use crate::model::WeatherReport;

/// Mock weather source keyed by lower-cased location
#[derive(Default)]
pub struct MockWeatherSource {
    reports: HashMap<String, WeatherReport>,
}

impl MockWeatherSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_report(mut self, report: WeatherReport) -> Self {
        self.reports.insert(report.location.to_lowercase(), report);
        self
    }
}

#[async_trait]
impl WeatherSource for MockWeatherSource {
    async fn current(&self, location: &str) -> Result<WeatherReport> {
        self.reports
            .get(&location.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| ServiceError::Status {
                service: "MockWeather",
                status: 404,
                message: format!("Unknown location: {location}"),
            })
    }

    fn name(&self) -> &str {
        "MockWeather"
    }
}
