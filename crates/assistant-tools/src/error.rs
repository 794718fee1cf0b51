//! Error Types for Upstream Services

use agent_core::{AgentError, ToolError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Unexpected response from {service}: {message}")]
    Payload {
        service: &'static str,
        message: String,
    },

    #[error("Could not find exchange rate for {0}")]
    MissingRate(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    pub(crate) fn payload(service: &'static str, message: impl Into<String>) -> Self {
        Self::Payload {
            service,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ToolError {
    fn from(err: ServiceError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<ServiceError> for AgentError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Config(msg) => Self::Config(msg),
            other => Self::Upstream(other.to_string()),
        }
    }
}

/// Turn a non-success status into [`ServiceError::Status`], keeping the body text
pub(crate) async fn check_status(service: &'static str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| json["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(200).collect());

    Err(ServiceError::Status {
        service,
        status: status.as_u16(),
        message,
    })
}

pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("assistant-tools/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::Config(format!("failed to build HTTP client: {e}")))
}
