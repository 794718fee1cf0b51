//! wttr.in client (JSON `format=j1`, no API key).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use super::WeatherSource;
use crate::error::{check_status, http_client, Result, ServiceError};
use crate::model::WeatherReport;

const WTTR_BASE: &str = "https://wttr.in";
const SERVICE: &str = "wttr.in";

pub struct WttrClient {
    http: reqwest::Client,
    base_url: String,
}

impl WttrClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: http_client(Duration::from_secs(10))?,
            base_url: WTTR_BASE.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request URL with the location as a single escaped path segment
    fn lookup_url(&self, location: &str) -> Result<Url> {
        let invalid_base = || ServiceError::Config(format!("invalid wttr.in base URL '{}'", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid_base())?;
        url.path_segments_mut()
            .map_err(|()| invalid_base())?
            .pop_if_empty()
            .push(location);
        url.query_pairs_mut().append_pair("format", "j1");
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WttrResponse {
    #[serde(default)]
    current_condition: Vec<CurrentCondition>,
}

/// wttr.in encodes every number as a string
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentCondition {
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "FeelsLikeC")]
    feels_like_c: String,
    humidity: String,
    weather_desc: Vec<Description>,
    windspeed_kmph: String,
    #[serde(rename = "winddir16Point")]
    wind_direction: String,
}

#[derive(Debug, Deserialize)]
struct Description {
    value: String,
}

fn number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ServiceError::payload(SERVICE, format!("invalid {field} '{raw}'")))
}

impl WttrResponse {
    pub(crate) fn into_report(self, location: &str) -> Result<WeatherReport> {
        let current = self
            .current_condition
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::payload(SERVICE, format!("no current conditions for '{location}'")))?;

        let conditions = current
            .weather_desc
            .into_iter()
            .map(|d| d.value.trim().to_string())
            .find(|d| !d.is_empty())
            .unwrap_or_else(|| "Unknown".into());

        Ok(WeatherReport {
            location: location.to_string(),
            temperature_c: number("temperature", &current.temp_c)?,
            feels_like_c: number("feels-like temperature", &current.feels_like_c)?,
            conditions,
            humidity: number("humidity", &current.humidity)?,
            wind_kmph: number("wind speed", &current.windspeed_kmph)?,
            wind_direction: current.wind_direction,
        })
    }
}

#[async_trait]
impl WeatherSource for WttrClient {
    async fn current(&self, location: &str) -> Result<WeatherReport> {
        tracing::debug!(location, "wttr.in lookup");

        let url = self.lookup_url(location.trim())?;
        let response = self.http.get(url).send().await?;

        let body = check_status(SERVICE, response).await?.text().await?;
        let parsed: WttrResponse = serde_json::from_str(&body).map_err(|_| {
            // Unknown locations come back as plain text
            ServiceError::payload(SERVICE, body.trim().chars().take(200).collect::<String>())
        })?;
        parsed.into_report(location.trim())
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current_condition() {
        let body = r#"{
            "current_condition": [{
                "FeelsLikeC": "9",
                "humidity": "71",
                "temp_C": "11",
                "weatherDesc": [{"value": "Partly cloudy"}],
                "winddir16Point": "WSW",
                "windspeedKmph": "19"
            }],
            "nearest_area": []
        }"#;

        let report = serde_json::from_str::<WttrResponse>(body)
            .unwrap()
            .into_report("Lisbon")
            .unwrap();

        assert_eq!(report.temperature_c, 11);
        assert_eq!(report.feels_like_c, 9);
        assert_eq!(report.conditions, "Partly cloudy");
        assert_eq!(report.humidity, 71);
        assert_eq!(report.wind_kmph, 19);
        assert_eq!(report.wind_direction, "WSW");
    }

    #[test]
    fn test_location_is_escaped_into_one_segment() {
        let client = WttrClient::new().unwrap();

        let url = client.lookup_url("Paris?format=3#x").unwrap();
        assert_eq!(url.path(), "/Paris%3Fformat=3%23x");
        assert_eq!(url.query(), Some("format=j1"));
        assert_eq!(url.fragment(), None);

        let url = client.lookup_url("New York/Queens").unwrap();
        assert_eq!(url.as_str(), "https://wttr.in/New%20York%2FQueens?format=j1");

        let url = client
            .with_base_url("http://127.0.0.1:8080/")
            .lookup_url("Oslo")
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/Oslo?format=j1");
    }

    #[test]
    fn test_missing_conditions_is_an_error() {
        let parsed: WttrResponse = serde_json::from_str(r#"{"current_condition": []}"#).unwrap();
        let err = parsed.into_report("Atlantis").unwrap_err();
        assert!(err.to_string().contains("Atlantis"));
    }
}
