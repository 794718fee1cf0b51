//! Weather Tool

use std::sync::Arc;

use agent_core::tool::{string_arg, Arguments, ParamType, ParameterSchema, Tool, ToolError, ToolSpec};
use async_trait::async_trait;

use crate::weather::WeatherSource;

/// Tool for current weather conditions
pub struct GetWeatherTool {
    source: Arc<dyn WeatherSource>,
}

impl GetWeatherTool {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetWeatherTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "get_weather",
            "Get the current weather for a location: temperature, conditions, humidity and wind.",
        )
        .parameter(ParameterSchema::required(
            "location",
            ParamType::String,
            "City or place name (e.g., 'Paris' or 'New York')",
        ))
    }

    fn validate(&self, arguments: &Arguments) -> Result<(), ToolError> {
        if string_arg(arguments, "location")?.trim().is_empty() {
            return Err(ToolError::InvalidArguments("location must not be empty".into()));
        }
        Ok(())
    }

    async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let location = string_arg(arguments, "location")?.trim();
        let report = self.source.current(location).await?;
        Ok(report.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherReport;
    use crate::weather::MockWeatherSource;
    use agent_core::ErrorKind;
    use serde_json::json;

    fn tool() -> GetWeatherTool {
        let source = MockWeatherSource::new().with_report(WeatherReport {
            location: "Paris".into(),
            temperature_c: 18,
            feels_like_c: 17,
            conditions: "Sunny".into(),
            humidity: 40,
            wind_kmph: 8,
            wind_direction: "SW".into(),
        });
        GetWeatherTool::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_known_location() {
        let args = serde_json::from_value(json!({"location": "paris"})).unwrap();
        let result = tool().invoke(&args).await;

        assert!(result.success);
        assert!(result.text.starts_with("Weather in Paris:\n- Temperature: 18°C (Feels like: 17°C)"));
        assert!(result.text.contains("- Wind: 8 km/h, SW"));
    }

    #[tokio::test]
    async fn test_unknown_location_keeps_upstream_message() {
        let args = serde_json::from_value(json!({"location": "Atlantis"})).unwrap();
        let result = tool().invoke(&args).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::UpstreamFailure));
        assert!(result.text.contains("Unknown location: Atlantis"));
        assert!(result.observation().starts_with("Error (upstream service failure): "));
    }
}
