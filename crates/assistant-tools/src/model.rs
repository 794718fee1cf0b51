//! Domain Models
//!
//! Values returned by the upstream services, with the text layout the model
//! sees as a tool observation.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// One web search hit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Numbered result list, or `No results found.` when empty
pub fn render_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.".into();
    }

    hits.iter()
        .enumerate()
        .map(|(i, hit)| format!("{}. {}\n   URL: {}\n   {}\n", i + 1, hit.title, hit.url, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Current conditions at a location
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub temperature_c: i32,
    pub feels_like_c: i32,
    pub conditions: String,
    pub humidity: u8,
    pub wind_kmph: u32,
    pub wind_direction: String,
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Weather in {}:", self.location)?;
        writeln!(
            f,
            "- Temperature: {}°C (Feels like: {}°C)",
            self.temperature_c, self.feels_like_c
        )?;
        writeln!(f, "- Conditions: {}", self.conditions)?;
        writeln!(f, "- Humidity: {}%", self.humidity)?;
        writeln!(f, "- Wind: {} km/h, {}", self.wind_kmph, self.wind_direction)
    }
}

/// Result of a currency conversion.
///
/// `rate` is absent only for a zero amount, where it cannot be derived.
/// Display rounds half away from zero: 2 places for the converted amount,
/// 6 for the rate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub amount: Decimal,
    pub from: String,
    pub to: String,
    pub converted: Decimal,
    pub rate: Option<Decimal>,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} = {:.2} {}",
            self.amount.normalize(),
            self.from,
            round(self.converted, 2),
            self.to
        )?;
        if let Some(rate) = self.rate {
            write!(f, "\nExchange rate: 1 {} = {:.6} {}", self.from, round(rate, 6), self.to)?;
        }
        Ok(())
    }
}

fn round(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_hits() {
        assert_eq!(render_hits(&[]), "No results found.");

        let hits = [
            SearchHit::new("Rust", "https://rust-lang.org", "A language"),
            SearchHit::new("Cargo", "https://doc.rust-lang.org/cargo", "Package manager"),
        ];
        assert_eq!(
            render_hits(&hits),
            "1. Rust\n   URL: https://rust-lang.org\n   A language\n\n\
             2. Cargo\n   URL: https://doc.rust-lang.org/cargo\n   Package manager\n"
        );
    }

    #[test]
    fn test_weather_layout() {
        let report = WeatherReport {
            location: "Oslo".into(),
            temperature_c: -3,
            feels_like_c: -8,
            conditions: "Light snow".into(),
            humidity: 86,
            wind_kmph: 14,
            wind_direction: "NNE".into(),
        };
        assert_eq!(
            report.to_string(),
            "Weather in Oslo:\n- Temperature: -3°C (Feels like: -8°C)\n- Conditions: Light snow\n\
             - Humidity: 86%\n- Wind: 14 km/h, NNE\n"
        );
    }

    #[test]
    fn test_conversion_layout() {
        let conversion = Conversion {
            amount: dec!(100),
            from: "USD".into(),
            to: "EUR".into(),
            converted: dec!(92.5),
            rate: Some(dec!(0.925)),
        };
        assert_eq!(
            conversion.to_string(),
            "100 USD = 92.50 EUR\nExchange rate: 1 USD = 0.925000 EUR"
        );

        let zero = Conversion {
            amount: Decimal::ZERO,
            from: "USD".into(),
            to: "JPY".into(),
            converted: Decimal::ZERO,
            rate: None,
        };
        assert_eq!(zero.to_string(), "0 USD = 0.00 JPY");
    }

    #[test]
    fn test_conversion_rounds_instead_of_truncating() {
        let conversion = Conversion {
            amount: dec!(1),
            from: "USD".into(),
            to: "EUR".into(),
            converted: dec!(0.6666666666),
            rate: Some(dec!(0.6666666666)),
        };
        assert_eq!(
            conversion.to_string(),
            "1 USD = 0.67 EUR\nExchange rate: 1 USD = 0.666667 EUR"
        );

        let midpoint = Conversion {
            amount: dec!(42.175),
            from: "GBP".into(),
            to: "GBP".into(),
            converted: dec!(42.175),
            rate: Some(Decimal::ONE),
        };
        assert_eq!(
            midpoint.to_string(),
            "42.175 GBP = 42.18 GBP\nExchange rate: 1 GBP = 1.000000 GBP"
        );
    }
}
