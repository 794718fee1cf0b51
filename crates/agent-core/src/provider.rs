//! Model Backend Strategy Pattern
//!
//! Defines a common interface for hosted and local LLMs (OpenAI, Gemini, Ollama)
//! so the reasoning loop works with any backend without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{ModelBackend, StepOutcome};
//!
//! let backend = GeminiBackend::new(config, GenerationOptions::default())?;
//!
//! match backend.step(&history, &registry.list_specs()).await? {
//!     StepOutcome::FinalAnswer(text) => println!("{text}"),
//!     StepOutcome::ToolCall(request) => { /* dispatch */ }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::History;
use crate::tool::{ToolCallRequest, ToolSpec};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TOP_P: f32 = 0.95;
pub const DEFAULT_TOP_K: u32 = 40;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that can use tools to answer questions. \
Use a tool whenever the question needs current information, weather or currency conversion. \
After receiving tool results, synthesize them into a concise and accurate answer.";

/// Configuration for LLM generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gemini-2.0-flash", "gpt-4o", "llama3.2")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    pub top_p: f32,

    /// Top-k sampling, for backends that support it
    pub top_k: Option<u32>,

    pub system_prompt: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            top_k: Some(DEFAULT_TOP_K),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
        }
    }
}

impl GenerationOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

/// What the model decided to do for one step
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// No further tool call needed
    FinalAnswer(String),

    /// Invoke a tool and report back
    ToolCall(ToolCallRequest),
}

/// Strategy trait for model backends
///
/// One network round trip per [`ModelBackend::step`]; the loop lives in the
/// driver, never in the backend.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Provider name for logs and health output
    fn name(&self) -> &str;

    fn options(&self) -> &GenerationOptions;

    /// Ask the model for the next step given the conversation and tool manifest
    async fn step(&self, history: &History, tools: &[ToolSpec]) -> Result<StepOutcome>;

    /// Check if the backend is reachable and configured correctly
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
