//! Tool System
//!
//! Extensible tool framework for agent capabilities.
//! Tools are registered at startup and invoked by the reasoning loop.
//!
//! Implementors provide [`Tool::spec`] and [`Tool::execute`]; callers only use
//! [`Tool::invoke`], which validates arguments, enforces the timeout and folds
//! every failure into a [`ToolResult`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::ErrorKind;

/// Default upper bound on a single tool execution
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(15);

/// Tool arguments as key-value pairs
pub type Arguments = HashMap<String, Value>;

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Tool identifier
    #[serde(alias = "tool", alias = "name")]
    pub tool_name: String,

    #[serde(default)]
    pub arguments: Arguments,

    /// Provider call ID, when the backend issues one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ToolCallRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Result from tool execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub tool_name: String,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success message or error)
    pub text: String,

    /// Set exactly when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ToolResult {
    pub fn success(tool_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            text: text.into(),
            error_kind: None,
        }
    }

    /// Failed result; an empty message is replaced by the kind's description.
    pub fn failure(tool_name: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut text = message.into();
        if text.trim().is_empty() {
            text = kind.describe().to_string();
        }
        Self {
            tool_name: tool_name.into(),
            success: false,
            text,
            error_kind: Some(kind),
        }
    }

    /// Text recorded as the observation turn for this result
    pub fn observation(&self) -> String {
        match self.error_kind {
            Some(kind) if !self.success => format!("Error ({kind}): {}", self.text),
            _ => self.text.clone(),
        }
    }
}

/// Failure raised inside a tool, converted to a [`ToolResult`] at the boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Upstream(String),
}

impl ToolError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::Upstream(_) => ErrorKind::UpstreamFailure,
        }
    }
}

/// JSON type accepted for a parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub param_type: ParamType,

    /// Human-readable description
    pub description: String,

    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Inclusive lower bound for numeric parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
}

impl ParameterSchema {
    pub fn required(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
            default: None,
            minimum: None,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Every accepted argument; anything else is rejected
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn parameter(mut self, parameter: ParameterSchema) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Check arguments against the declared parameters.
    pub fn validate(&self, arguments: &Arguments) -> Result<(), ToolError> {
        let mut unknown: Vec<&str> = arguments
            .keys()
            .filter(|key| !self.parameters.iter().any(|p| &p.name == *key))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(ToolError::InvalidArguments(format!(
                "Unknown parameter(s) for {}: {}",
                self.name,
                unknown.join(", ")
            )));
        }

        for param in &self.parameters {
            let value = match arguments.get(&param.name) {
                Some(Value::Null) | None if param.required => {
                    return Err(ToolError::InvalidArguments(format!(
                        "Missing required parameter: {}",
                        param.name
                    )));
                }
                Some(Value::Null) | None => continue,
                Some(value) => value,
            };

            if !param.param_type.accepts(value) {
                return Err(ToolError::InvalidArguments(format!(
                    "Parameter '{}' must be of type {}",
                    param.name, param.param_type
                )));
            }

            if let (Some(minimum), Some(number)) = (param.minimum, value.as_f64()) {
                if number < minimum {
                    return Err(ToolError::InvalidArguments(format!(
                        "Parameter '{}' must be at least {minimum}",
                        param.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// JSON Schema object describing the parameters
    pub fn json_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        for param in &self.parameters {
            let mut property = serde_json::json!({
                "type": param.param_type.as_str(),
                "description": param.description,
            });
            if let Some(default) = &param.default {
                property["default"] = default.clone();
            }
            if let Some(minimum) = param.minimum {
                property["minimum"] = serde_json::json!(minimum);
            }
            properties.insert(param.name.clone(), property);
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn spec(&self) -> ToolSpec;

    /// Tool-specific checks run after schema validation
    fn validate(&self, _arguments: &Arguments) -> Result<(), ToolError> {
        Ok(())
    }

    fn timeout(&self) -> Duration {
        DEFAULT_TOOL_TIMEOUT
    }

    /// Perform the tool's work on already-validated arguments
    async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError>;

    /// Validate, execute under the timeout, and fold any failure into the result.
    async fn invoke(&self, arguments: &Arguments) -> ToolResult {
        let spec = self.spec();

        if let Err(e) = spec.validate(arguments).and_then(|()| self.validate(arguments)) {
            tracing::debug!(tool = %spec.name, error = %e, "Rejected tool arguments");
            return ToolResult::failure(spec.name, e.kind(), e.to_string());
        }

        let limit = self.timeout();
        match tokio::time::timeout(limit, self.execute(arguments)).await {
            Ok(Ok(text)) => ToolResult::success(spec.name, text),
            Ok(Err(e)) => {
                tracing::warn!(tool = %spec.name, error = %e, "Tool failed");
                ToolResult::failure(spec.name, e.kind(), e.to_string())
            }
            Err(_) => {
                tracing::warn!(tool = %spec.name, timeout_secs = limit.as_secs(), "Tool timed out");
                ToolResult::failure(
                    spec.name,
                    ErrorKind::UpstreamFailure,
                    format!("Timed out after {}s", limit.as_secs()),
                )
            }
        }
    }
}

/// Read a string argument
pub fn string_arg<'a>(arguments: &'a Arguments, name: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing required parameter: {name}")))
}
