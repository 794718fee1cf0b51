//! # agent-core
//!
//! Core agent logic with provider-agnostic model abstraction and extensible tool system.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ConversationSession                       │
//! │  History (owned)          Agent (shared)                    │
//! │                  ┌─────────────┐  ┌─────────────────────┐   │
//! │                  │ Loop Driver │──│   ToolRegistry      │   │
//! │                  │ (reasoning) │──│   ModelBackend      │   │
//! │                  └─────────────┘  └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `ModelBackend` trait enables swapping between Gemini, OpenAI, Ollama,
//! or any other provider without changing agent logic.

pub mod error;
pub mod message;
pub mod mock;
pub mod protocol;
pub mod provider;
pub mod reasoning;
pub mod registry;
pub mod session;
pub mod tool;

pub use error::{AgentError, ErrorKind, Result};
pub use message::{History, Turn, TurnRole};
pub use provider::{GenerationOptions, ModelBackend, StepOutcome};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, RunOutcome, Termination};
pub use registry::ToolRegistry;
pub use session::{ConversationSession, SessionId};
pub use tool::{Arguments, ParamType, ParameterSchema, Tool, ToolCallRequest, ToolError, ToolResult, ToolSpec};
