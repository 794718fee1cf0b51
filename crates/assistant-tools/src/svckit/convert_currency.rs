//! Currency Conversion Tool
//!
//! Decimal arithmetic throughout; identity and zero-amount conversions are
//! answered locally without a rate lookup.

use std::str::FromStr;
use std::sync::Arc;

use agent_core::tool::{string_arg, Arguments, ParamType, ParameterSchema, Tool, ToolError, ToolSpec};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::currency::{is_currency_code, RateSource};
use crate::error::ServiceError;
use crate::model::Conversion;

const CODE_PARAMS: [&str; 2] = ["from_currency", "to_currency"];

/// Tool for converting between currencies
pub struct ConvertCurrencyTool {
    rates: Arc<dyn RateSource>,
}

impl ConvertCurrencyTool {
    pub fn new(rates: Arc<dyn RateSource>) -> Self {
        Self { rates }
    }

    /// Convert `amount` between two upper-case codes
    pub async fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Conversion, ServiceError> {
        let (converted, rate) = if from == to {
            (amount, Some(Decimal::ONE))
        } else if amount.is_zero() {
            (Decimal::ZERO, None)
        } else {
            let converted = self.rates.convert(amount, from, to).await?;
            let rate = converted
                .checked_div(amount)
                .ok_or_else(|| ServiceError::payload("exchange rate", format!("cannot derive rate from {converted}")))?;
            (converted, Some(rate))
        };

        Ok(Conversion {
            amount,
            from: from.to_string(),
            to: to.to_string(),
            converted,
            rate,
        })
    }
}

fn decimal_arg(arguments: &Arguments, name: &str) -> Result<Decimal, ToolError> {
    let number = arguments
        .get(name)
        .and_then(Value::as_number)
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing required parameter: {name}")))?;

    let raw = number.to_string();
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|e| ToolError::InvalidArguments(format!("{name} '{raw}' is not a valid amount: {e}")))
}

#[async_trait]
impl Tool for ConvertCurrencyTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "convert_currency",
            "Convert an amount from one currency to another using current exchange rates.",
        )
        .parameter(
            ParameterSchema::required("amount", ParamType::Number, "The amount to convert").with_minimum(0.0),
        )
        .parameter(ParameterSchema::required(
            "from_currency",
            ParamType::String,
            "Source currency code (e.g., USD, EUR, GBP)",
        ))
        .parameter(ParameterSchema::required(
            "to_currency",
            ParamType::String,
            "Target currency code (e.g., USD, EUR, GBP)",
        ))
    }

    fn validate(&self, arguments: &Arguments) -> Result<(), ToolError> {
        for param in CODE_PARAMS {
            let code = string_arg(arguments, param)?;
            if !is_currency_code(code) {
                return Err(ToolError::InvalidArguments(format!(
                    "{param} must be a 3-letter currency code, got '{code}'"
                )));
            }
        }
        decimal_arg(arguments, "amount").map(|_| ())
    }

    async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let amount = decimal_arg(arguments, "amount")?;
        let from = string_arg(arguments, "from_currency")?.to_ascii_uppercase();
        let to = string_arg(arguments, "to_currency")?.to_ascii_uppercase();

        let conversion = self.convert(amount, &from, &to).await?;
        tracing::debug!(rates = self.rates.name(), converted = %conversion.converted, "Converted {amount} {from} to {to}");

        Ok(conversion.to_string())
    }
}
