//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) cycle as an explicit state machine:
//!
//! ```text
//! Idle → Thinking → (ToolDispatch → Thinking)* → Responding → Idle
//!            └──────────────┴──────→ Failed
//! ```
//!
//! The driver is the only writer of a conversation's [`History`]. Every
//! per-turn failure ends up as assistant text; nothing escapes to the caller.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::{AgentError, ErrorKind, Result};
use crate::message::{History, Turn};
use crate::provider::{ModelBackend, StepOutcome};
use crate::registry::ToolRegistry;
use crate::tool::{Tool, ToolCallRequest, ToolSpec};

pub const DEFAULT_MAX_ITERATIONS: usize = 5;

pub const EXHAUSTED_MESSAGE: &str =
    "I could not complete this request within the allowed number of steps. Please try a simpler or more specific question.";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum Thinking → ToolDispatch cycles per run
    pub max_iterations: usize,

    /// Budget for a whole run, spread over its backend steps
    pub run_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            run_timeout: None,
        }
    }
}

/// Driver states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Thinking,
    ToolDispatch,
    Responding,
    Failed,
}

/// How a run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "error")]
pub enum Termination {
    /// The model produced a final answer
    Answered,
    /// The iteration bound cut the run short
    Exhausted,
    /// The backend failed; the error text was returned as the answer
    Failed(ErrorKind),
}

/// Full result of one `run`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Text shown to the user (also the last assistant turn)
    pub text: String,
    pub termination: Termination,
    /// Tool dispatch cycles performed
    pub iterations: usize,
}

/// The loop driver
pub struct Agent {
    backend: Arc<dyn ModelBackend>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(backend: Arc<dyn ModelBackend>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        Self { backend, tools, config }
    }

    /// Create with default configuration
    pub fn with_defaults(backend: Arc<dyn ModelBackend>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(backend, tools, AgentConfig::default())
    }

    /// Run one user message to completion and return the text to display
    pub async fn run(&self, history: &mut History, user_input: &str) -> String {
        self.run_detailed(history, user_input).await.text
    }

    /// Run one user message, reporting how the run terminated
    pub async fn run_detailed(&self, history: &mut History, user_input: &str) -> RunOutcome {
        let deadline = self.config.run_timeout.map(|t| Instant::now() + t);
        let manifest = self.tools.list_specs();

        history.push(Turn::user(user_input));

        let mut state = DriverState::Thinking;
        let mut iterations = 0;
        let mut pending: Option<ToolCallRequest> = None;
        let mut reply = String::new();
        let mut termination = Termination::Answered;

        loop {
            tracing::debug!(?state, iterations, "Driver state");

            state = match state {
                DriverState::Thinking => match self.step(history, &manifest, deadline).await {
                    Ok(StepOutcome::FinalAnswer(text)) => {
                        reply = text;
                        DriverState::Responding
                    }
                    Ok(StepOutcome::ToolCall(request)) if iterations >= self.config.max_iterations => {
                        tracing::warn!(
                            tool = %request.tool_name,
                            max = self.config.max_iterations,
                            "Iteration bound reached"
                        );
                        reply = EXHAUSTED_MESSAGE.into();
                        termination = Termination::Exhausted;
                        DriverState::Responding
                    }
                    Ok(StepOutcome::ToolCall(request)) => {
                        pending = Some(request);
                        DriverState::ToolDispatch
                    }
                    Err(e) => {
                        tracing::warn!(backend = self.backend.name(), error = %e, "Backend step failed");
                        reply = e.user_message();
                        termination = Termination::Failed(e.kind());
                        DriverState::Failed
                    }
                },
                DriverState::ToolDispatch => {
                    if let Some(request) = pending.take() {
                        iterations += 1;
                        self.dispatch(history, &request).await;
                    }
                    DriverState::Thinking
                }
                DriverState::Responding | DriverState::Failed => {
                    history.push(Turn::assistant(reply.clone()));
                    DriverState::Idle
                }
                DriverState::Idle => break,
            };
        }

        RunOutcome {
            text: reply,
            termination,
            iterations,
        }
    }

    /// One backend round trip, bounded by what is left of the run budget
    async fn step(
        &self,
        history: &History,
        manifest: &[ToolSpec],
        deadline: Option<Instant>,
    ) -> Result<StepOutcome> {
        let Some(deadline) = deadline else {
            return self.backend.step(history, manifest).await;
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        tokio::time::timeout(remaining, self.backend.step(history, manifest))
            .await
            .map_err(|_| AgentError::Upstream("the request timed out".into()))?
    }

    /// Invoke the requested tool and record its observation
    async fn dispatch(&self, history: &mut History, request: &ToolCallRequest) {
        tracing::debug!(tool = %request.tool_name, id = ?request.id, "Executing tool");

        let result = self.tools.invoke(request).await;

        if !result.success {
            tracing::debug!(tool = %result.tool_name, kind = ?result.error_kind, "Tool reported failure");
        }
        history.push(Turn::tool_observation(result.tool_name.clone(), result.observation()));
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn backend(&self) -> &dyn ModelBackend {
        self.backend.as_ref()
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
#[derive(Default)]
pub struct AgentBuilder {
    backend: Option<Arc<dyn ModelBackend>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: Arc<dyn ModelBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Add a tool; duplicate names fail the build
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Result<Self> {
        self.tools.register(tool)?;
        Ok(self)
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn run_timeout(mut self, timeout: Duration) -> Self {
        self.config.run_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Agent> {
        let backend = self
            .backend
            .ok_or_else(|| AgentError::Config("Model backend is required".into()))?;

        Ok(Agent::new(backend, Arc::new(self.tools), self.config))
    }
}
