//! Google Gemini Model Backend
//!
//! Generative Language API (`generateContent`) with function declarations.

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

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,

    /// Whether the model accepts `systemInstruction`; Gemma-family models do not
    pub system_instruction: bool,

    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("system_instruction", &self.system_instruction)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            system_instruction: true,
            timeout_secs: 120,
        }
    }

    pub const fn with_system_instruction(mut self, supported: bool) -> Self {
        self.system_instruction = supported;
        self
    }
}

/// Gemini backend
pub struct GeminiBackend {
    http: reqwest::Client,
    config: GeminiConfig,
    options: GenerationOptions,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig, options: GenerationOptions) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AgentError::Config("Google API key is empty".into()));
        }

        Ok(Self {
            http: http::client(Duration::from_secs(config.timeout_secs))?,
            config,
            options,
        })
    }

    fn api_url(&self) -> String {
        format!("{GEMINI_API_BASE}/{}:generateContent", self.options.model)
    }

    /// Build the JSON request body for the Gemini API.
    pub(crate) fn build_request_body(&self, history: &History, tools: &[ToolSpec]) -> Value {
        let mut contents = Vec::new();
        let mut fold_system = !self.config.system_instruction;

        for turn in history {
            let (role, mut text) = match turn.role() {
                TurnRole::User => ("user", turn.content().to_string()),
                TurnRole::Assistant => ("model", turn.content().to_string()),
                TurnRole::ToolObservation => ("user", observation_text(turn)),
            };

            if fold_system && role == "user" {
                text = format!("{}\n\n{text}", self.options.system_prompt);
                fold_system = false;
            }

            contents.push(json!({
                "role": role,
                "parts": [{ "text": text }]
            }));
        }

        let mut generation_config = json!({
            "maxOutputTokens": self.options.max_tokens,
            "temperature": self.options.temperature,
            "topP": self.options.top_p,
        });
        if let Some(top_k) = self.options.top_k {
            generation_config["topK"] = json!(top_k);
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });

        if self.config.system_instruction {
            body["systemInstruction"] = json!({
                "parts": [{ "text": self.options.system_prompt }]
            });
        }

        if !tools.is_empty() {
            let declarations: Vec<Value> = tools.iter().map(function_declaration).collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        body
    }

    /// Parse a Gemini response.
    pub(crate) fn parse_response(json: &Value) -> Result<StepOutcome> {
        let first = json["candidates"]
            .as_array()
            .and_then(|candidates| candidates.first())
            .ok_or_else(|| {
                let reason = json["promptFeedback"]["blockReason"].as_str().unwrap_or("no candidates in response");
                AgentError::Parse(reason.to_string())
            })?;

        let parts = first["content"]["parts"].as_array().cloned().unwrap_or_default();

        let mut content = String::new();
        for part in &parts {
            if let Some(fc) = part.get("functionCall") {
                let name = fc["name"]
                    .as_str()
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| AgentError::Parse("functionCall without a name".into()))?;
                let arguments: Arguments = match &fc["args"] {
                    Value::Null => Arguments::new(),
                    args => serde_json::from_value(args.clone())
                        .map_err(|e| AgentError::Parse(format!("invalid args for {name}: {e}")))?,
                };
                return Ok(StepOutcome::ToolCall(
                    ToolCallRequest::new(name, arguments).with_id(uuid::Uuid::new_v4().to_string()),
                ));
            }
            if let Some(text) = part["text"].as_str() {
                content.push_str(text);
            }
        }

        if content.trim().is_empty() {
            let reason = first["finishReason"].as_str().unwrap_or("empty response");
            return Err(AgentError::Parse(format!("no text in candidate ({reason})")));
        }

        Ok(StepOutcome::FinalAnswer(content))
    }
}

/// Function declaration in the OpenAPI subset Gemini accepts
fn function_declaration(spec: &ToolSpec) -> Value {
    let mut declaration = json!({
        "name": spec.name,
        "description": spec.description,
    });

    // An OBJECT schema with no properties is rejected, so omit it entirely
    if !spec.parameters.is_empty() {
        let mut properties = serde_json::Map::new();
        for param in &spec.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.param_type.as_str(),
                    "description": param.description,
                }),
            );
        }
        let required: Vec<&str> = spec
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        declaration["parameters"] = json!({
            "type": "object",
            "properties": properties,
            "required": required,
        });
    }

    declaration
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn options(&self) -> &GenerationOptions {
        &self.options
    }

    async fn step(&self, history: &History, tools: &[ToolSpec]) -> Result<StepOutcome> {
        let body = self.build_request_body(history, tools);

        tracing::debug!(model = %self.options.model, turns = history.len(), "Gemini API request");

        let response = self
            .http
            .post(self.api_url())
            .header("x-goog-api-key", &self.config.api_key)
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
            .get(format!("{GEMINI_API_BASE}/{}", self.options.model))
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| http::transport_error(&e))?;

        match http::check_status(response).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }
}
