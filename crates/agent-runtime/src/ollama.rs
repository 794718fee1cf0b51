//! Ollama Model Backend
//!
//! Local inference through `ollama-rs`. Ollama has no function calling here,
//! so tools are advertised in the system prompt and calls are read back out
//! of the reply with the fenced-block protocol.

use agent_core::{
    error::{AgentError, Result},
    message::{History, TurnRole},
    protocol::{observation_text, parse_tool_call, prompt_section},
    provider::{GenerationOptions, ModelBackend, StepOutcome},
    tool::ToolSpec,
};
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage, MessageRole},
    models::ModelOptions,
    Ollama,
};

/// Ollama connection settings
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
        }
    }
}

/// Ollama backend
pub struct OllamaBackend {
    client: Ollama,
    options: GenerationOptions,
}

impl OllamaBackend {
    pub fn new(config: &OllamaConfig, options: GenerationOptions) -> Self {
        Self {
            client: Ollama::new(config.host.clone(), config.port),
            options,
        }
    }

    /// Connect to `http://localhost:11434`
    pub fn localhost(options: GenerationOptions) -> Self {
        Self::new(&OllamaConfig::default(), options)
    }

    fn system_prompt(&self, tools: &[ToolSpec]) -> String {
        if tools.is_empty() {
            self.options.system_prompt.clone()
        } else {
            format!("{}\n\n{}", self.options.system_prompt, prompt_section(tools))
        }
    }

    pub(crate) fn convert_history(&self, history: &History, tools: &[ToolSpec]) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::new(MessageRole::System, self.system_prompt(tools))];
        messages.extend(history.iter().map(|turn| match turn.role() {
            TurnRole::User => ChatMessage::new(MessageRole::User, turn.content().to_string()),
            TurnRole::Assistant => ChatMessage::new(MessageRole::Assistant, turn.content().to_string()),
            TurnRole::ToolObservation => ChatMessage::new(MessageRole::User, observation_text(turn)),
        }));
        messages
    }

    fn build_options(opts: &GenerationOptions) -> ModelOptions {
        let mut options = ModelOptions::default()
            .temperature(opts.temperature)
            .top_p(opts.top_p)
            .num_predict(i32::try_from(opts.max_tokens).unwrap_or(i32::MAX));
        if let Some(top_k) = opts.top_k {
            options = options.top_k(top_k);
        }
        options
    }

    /// Interpret a raw reply as either a tool call or the final answer.
    pub(crate) fn interpret(content: &str) -> Result<StepOutcome> {
        if let Some(request) = parse_tool_call(content)? {
            return Ok(StepOutcome::ToolCall(request));
        }

        if content.trim().is_empty() {
            return Err(AgentError::Parse("empty response from Ollama".into()));
        }
        Ok(StepOutcome::FinalAnswer(content.trim().to_string()))
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    fn name(&self) -> &str {
        "Ollama"
    }

    fn options(&self) -> &GenerationOptions {
        &self.options
    }

    async fn step(&self, history: &History, tools: &[ToolSpec]) -> Result<StepOutcome> {
        let request = ChatMessageRequest::new(self.options.model.clone(), self.convert_history(history, tools))
            .options(Self::build_options(&self.options));

        tracing::debug!(model = %self.options.model, turns = history.len(), "Ollama chat request");

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AgentError::Upstream(e.to_string()))?;

        Self::interpret(&response.message.content)
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{ParamType, ParameterSchema, Turn};

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.port, 11434);
    }

    #[test]
    fn test_history_conversion() {
        let backend = OllamaBackend::localhost(GenerationOptions::default().with_system_prompt("Be brief."));
        let history: History = [
            Turn::user("Search for rust"),
            Turn::tool_observation("search_web", "1. Rust"),
        ]
        .into_iter()
        .collect();
        let tools = [ToolSpec::new("search_web", "Search")
            .parameter(ParameterSchema::required("query", ParamType::String, "Query"))];

        let converted = backend.convert_history(&history, &tools);
        assert_eq!(converted.len(), 3);
        assert!(converted[0].content.starts_with("Be brief."));
        assert!(converted[0].content.contains("search_web"));
        assert!(converted[2].content.contains("[Tool 'search_web' returned]"));
    }

    #[test]
    fn test_interpret_reply() {
        let call = "```tool\n{\"tool\": \"get_weather\", \"arguments\": {\"location\": \"Oslo\"}}\n```";
        let StepOutcome::ToolCall(request) = OllamaBackend::interpret(call).unwrap() else {
            panic!("expected a tool call");
        };
        assert_eq!(request.tool_name, "get_weather");

        assert_eq!(
            OllamaBackend::interpret("  Hi!\n").unwrap(),
            StepOutcome::FinalAnswer("Hi!".into())
        );
        assert!(matches!(OllamaBackend::interpret(" "), Err(AgentError::Parse(_))));
    }
}
