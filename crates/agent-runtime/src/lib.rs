//! # agent-runtime
//!
//! Model backend implementations for agent-core.
//!
//! ## Supported Backends
//!
//! - **OpenAI**: chat completions with native function calling
//! - **Gemini**: `generateContent` with function declarations
//! - **Ollama**: local models, tools via the fenced-block protocol (feature `ollama`)
//!
//! [`RuntimeConfig`] reads the environment and picks one of them.

pub mod config;
pub mod gemini;
mod http;
pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use config::{ProviderKind, RuntimeConfig};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use openai::{OpenAiBackend, OpenAiConfig};

#[cfg(feature = "ollama")]
pub use ollama::{OllamaBackend, OllamaConfig};
