//! Assistant Tools
//!
//! `Tool` implementations wrapping the upstream services.

mod convert_currency;
mod get_weather;
mod search_web;

pub use convert_currency::ConvertCurrencyTool;
pub use get_weather::GetWeatherTool;
pub use search_web::SearchWebTool;
