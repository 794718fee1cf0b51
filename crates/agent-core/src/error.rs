//! Error Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Failure taxonomy shared by tool results, backend errors and run outcomes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArguments,
    UpstreamFailure,
    AuthFailure,
    RateLimited,
    ParseFailure,
    ToolNotFound,
    IterationExhausted,
    DuplicateName,
    ConfigurationError,
}

impl ErrorKind {
    /// Short description used when a failure carries no message of its own
    pub const fn describe(self) -> &'static str {
        match self {
            Self::InvalidArguments => "invalid arguments",
            Self::UpstreamFailure => "upstream service failure",
            Self::AuthFailure => "authentication failure",
            Self::RateLimited => "rate limited",
            Self::ParseFailure => "malformed model output",
            Self::ToolNotFound => "tool not found",
            Self::IterationExhausted => "iteration limit reached",
            Self::DuplicateName => "duplicate tool name",
            Self::ConfigurationError => "configuration error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Arguments rejected by a tool schema or validator
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Network failure, timeout or non-success status from a provider or service
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Credential rejected by the provider
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Provider refused the request because of rate limits
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Model output could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Maximum iterations reached in reasoning loop
    #[error("Maximum iterations ({0}) reached")]
    IterationExhausted(usize),

    /// Tool registered twice under the same name
    #[error("Duplicate tool name: {0}")]
    DuplicateName(String),

    /// Configuration error (missing credential, malformed setting)
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Position of this error in the failure taxonomy
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::Upstream(_) => ErrorKind::UpstreamFailure,
            Self::Auth(_) => ErrorKind::AuthFailure,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::Parse(_) | Self::Json(_) => ErrorKind::ParseFailure,
            Self::ToolNotFound(_) => ErrorKind::ToolNotFound,
            Self::IterationExhausted(_) => ErrorKind::IterationExhausted,
            Self::DuplicateName(_) => ErrorKind::DuplicateName,
            Self::Config(_) => ErrorKind::ConfigurationError,
        }
    }

    /// Whether this error must stop a session from starting
    pub const fn is_setup_error(&self) -> bool {
        matches!(self, Self::DuplicateName(_) | Self::Config(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Upstream(msg) => format!("The AI service encountered an error: {msg}"),
            Self::Auth(_) => "Authentication with the AI service failed. Please check your API key.".into(),
            Self::RateLimited(_) => "The AI service is rate limiting requests. Please wait a moment and try again.".into(),
            Self::Parse(_) | Self::Json(_) => "The AI service returned a response that could not be understood.".into(),
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            Self::InvalidArguments(msg) => format!("Invalid tool input: {msg}"),
            Self::IterationExhausted(_) => "The request took too many steps to complete. Please try a simpler query.".into(),
            Self::Config(msg) => format!("The assistant is not configured correctly: {msg}"),
            Self::DuplicateName(name) => format!("The tool '{name}' is registered more than once."),
        }
    }
}
