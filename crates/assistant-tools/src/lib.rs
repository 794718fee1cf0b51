//! # assistant-tools
//!
//! The assistant's tools: web search, current weather and currency conversion.
//!
//! Each tool talks to its upstream through a trait so tests and demos can swap
//! in the mock implementations:
//!
//! ```text
//! search_web        ──▶ SearchBackend  (DuckDuckGo | MockSearchBackend)
//! get_weather       ──▶ WeatherSource  (wttr.in    | MockWeatherSource)
//! convert_currency  ──▶ RateSource     (Frankfurter| MockRateSource)
//! ```

pub mod currency;
pub mod error;
pub mod model;
pub mod search;
pub mod svckit;
pub mod weather;

use std::sync::Arc;

use agent_core::ToolRegistry;

pub use error::{Result, ServiceError};
pub use model::{Conversion, SearchHit, WeatherReport};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{ConvertCurrencyTool, GetWeatherTool, SearchWebTool};
}

use currency::{FrankfurterClient, RateSource};
use search::{DuckDuckGoClient, SearchBackend};
use weather::{WeatherSource, WttrClient};

/// Registry with the three tools backed by the public services
pub fn default_registry() -> agent_core::Result<ToolRegistry> {
    registry_with(
        Arc::new(DuckDuckGoClient::new()?),
        Arc::new(WttrClient::new()?),
        Arc::new(FrankfurterClient::new()?),
    )
}

/// Registry with the three tools backed by the given upstreams
pub fn registry_with(
    search: Arc<dyn SearchBackend>,
    weather: Arc<dyn WeatherSource>,
    rates: Arc<dyn RateSource>,
) -> agent_core::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(tools::SearchWebTool::new(search))?;
    registry.register(tools::GetWeatherTool::new(weather))?;
    registry.register(tools::ConvertCurrencyTool::new(rates))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{mock::ScriptedBackend, Agent, History, Termination, ToolCallRequest, TurnRole};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn mock_registry() -> ToolRegistry {
        registry_with(
            Arc::new(search::MockSearchBackend::new(vec![SearchHit::new(
                "Rust",
                "https://www.rust-lang.org/",
                "A language empowering everyone",
            )])),
            Arc::new(weather::MockWeatherSource::new()),
            Arc::new(currency::MockRateSource::new().with_rate("USD", "JPY", dec!(150))),
        )
        .unwrap()
    }

    #[test]
    fn test_manifest_order() {
        let registry = mock_registry();
        let names: Vec<String> = registry.list_specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["search_web", "get_weather", "convert_currency"]);
        assert_eq!(registry.list_specs(), registry.list_specs());
    }

    #[tokio::test]
    async fn test_conversation_with_currency_tool() {
        let call = ToolCallRequest::new(
            "convert_currency",
            serde_json::from_value(json!({"amount": 2, "from_currency": "usd", "to_currency": "jpy"})).unwrap(),
        );
        let backend = ScriptedBackend::new().tool_call(call).answer("2 USD is 300 JPY.");
        let agent = Agent::with_defaults(Arc::new(backend), Arc::new(mock_registry()));

        let mut history = History::new();
        let outcome = agent.run_detailed(&mut history, "How many yen is 2 dollars?").await;

        assert_eq!(outcome.termination, Termination::Answered);
        assert_eq!(outcome.text, "2 USD is 300 JPY.");

        let observation = &history.turns()[1];
        assert_eq!(observation.role(), TurnRole::ToolObservation);
        assert_eq!(observation.tool_name(), Some("convert_currency"));
        assert_eq!(
            observation.content(),
            "2 USD = 300.00 JPY\nExchange rate: 1 USD = 150.000000 JPY"
        );
    }
}
