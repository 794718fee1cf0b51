//! Shared HTTP plumbing for hosted model backends.

use std::time::Duration;

use agent_core::error::{AgentError, Result};
use reqwest::{Response, StatusCode};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const ERROR_BODY_LIMIT: usize = 200;

pub(crate) fn client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
        .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn transport_error(err: &reqwest::Error) -> AgentError {
    if err.is_timeout() {
        AgentError::Upstream("request timed out".into())
    } else {
        AgentError::Upstream(err.to_string())
    }
}

/// Pass successful responses through, classify everything else
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(classify(status, &text))
}

pub(crate) fn classify(status: StatusCode, body: &str) -> AgentError {
    let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(format!("HTTP {status}: {body}")),
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(format!("HTTP {status}: {body}")),
        // Gemini reports a bad key as 400
        StatusCode::BAD_REQUEST if body.contains("API_KEY_INVALID") => {
            AgentError::Auth(format!("HTTP {status}: {body}"))
        }
        _ => AgentError::Upstream(format!("HTTP {status}: {body}")),
    }
}

pub(crate) async fn json_body(response: Response) -> Result<serde_json::Value> {
    response
        .json()
        .await
        .map_err(|e| AgentError::Parse(e.to_string()))
}
