//! OpenAI Model Backend
//!
//! Chat Completions API with native function calling.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{History, TurnRole},
    protocol::observation_text,
    provider::{GenerationOptions, ModelBackend, StepOutcome},
    tool::{Arguments, ToolCallRequest, ToolSpec},
};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::http;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI provider configuration
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,

    /// API base URL (override for compatible gateways)
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.into(),
            timeout_secs: 120,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// OpenAI chat completions backend
pub struct OpenAiBackend {
    http: reqwest::Client,
    config: OpenAiConfig,
    options: GenerationOptions,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig, options: GenerationOptions) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AgentError::Config("OpenAI API key is empty".into()));
        }

        Ok(Self {
            http: http::client(Duration::from_secs(config.timeout_secs))?,
            config,
            options,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Build the JSON request body for the Chat Completions API.
    pub(crate) fn build_request_body(&self, history: &History, tools: &[ToolSpec]) -> Value {
        let mut messages = vec![json!({
            "role": "system",
            "content": self.options.system_prompt,
        })];

        for turn in history {
            let message = match turn.role() {
                TurnRole::User => json!({"role": "user", "content": turn.content()}),
                TurnRole::Assistant => json!({"role": "assistant", "content": turn.content()}),
                // Observations are replayed as user context, not tool-role messages
                TurnRole::ToolObservation => json!({"role": "user", "content": observation_text(turn)}),
            };
            messages.push(message);
        }

        let mut body = json!({
            "model": self.options.model,
            "messages": messages,
            "temperature": self.options.temperature,
            "max_tokens": self.options.max_tokens,
            "top_p": self.options.top_p,
        });

        if self.options.top_k.is_some() {
            tracing::debug!(model = %self.options.model, "OpenAI does not support top_k; ignoring");
        }

        if !tools.is_empty() {
            let functions: Vec<Value> = tools
                .iter()
                .map(|spec| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": spec.name,
                            "description": spec.description,
                            "parameters": spec.json_schema(),
                        }
                    })
                })
                .collect();
            body["tools"] = json!(functions);
            body["tool_choice"] = json!("auto");
            body["parallel_tool_calls"] = json!(false);
        }

        body
    }

    /// Parse a Chat Completions response.
    pub(crate) fn parse_response(json: &Value) -> Result<StepOutcome> {
        let message = json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .map(|choice| &choice["message"])
            .ok_or_else(|| AgentError::Parse("no choices in response".into()))?;

        if let Some(call) = message["tool_calls"].as_array().and_then(|calls| calls.first()) {
            let function = &call["function"];
            let name = function["name"]
                .as_str()
                .filter(|n| !n.is_empty())
                .ok_or_else(|| AgentError::Parse("tool call without a function name".into()))?;

            // Arguments arrive as a JSON-encoded string
            let raw = function["arguments"].as_str().unwrap_or("{}");
            let arguments: Arguments = if raw.trim().is_empty() {
                Arguments::new()
            } else {
                serde_json::from_str(raw)
                    .map_err(|e| AgentError::Parse(format!("invalid arguments for {name}: {e}")))?
            };

            let mut request = ToolCallRequest::new(name, arguments);
            if let Some(id) = call["id"].as_str() {
                request = request.with_id(id);
            }
            return Ok(StepOutcome::ToolCall(request));
        }

        match message["content"].as_str() {
            Some(text) if !text.trim().is_empty() => Ok(StepOutcome::FinalAnswer(text.to_string())),
            _ => Err(AgentError::Parse("response has neither content nor tool call".into())),
        }
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn options(&self) -> &GenerationOptions {
        &self.options
    }

    async fn step(&self, history: &History, tools: &[ToolSpec]) -> Result<StepOutcome> {
        let body = self.build_request_body(history, tools);

        tracing::debug!(model = %self.options.model, turns = history.len(), "OpenAI API request");

        let response = self
            .http
            .post(self.url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| http::transport_error(&e))?;

        let json = http::json_body(http::check_status(response).await?).await?;
        Self::parse_response(&json)
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .http
            .get(self.url("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| http::transport_error(&e))?;

        match http::check_status(response).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }
}
