//! Scripted Model Backend
//!
//! For tests and demos. Replays a fixed sequence of steps instead of calling a
//! model, optionally repeating one tool call forever.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::message::History;
use crate::provider::{GenerationOptions, ModelBackend, StepOutcome};
use crate::tool::{ToolCallRequest, ToolSpec};

/// Backend that answers from a script
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<StepOutcome>>>,
    repeat: Option<ToolCallRequest>,
    delay: Option<Duration>,
    steps: Arc<AtomicUsize>,
    options: GenerationOptions,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a final answer
    pub fn answer(self, text: impl Into<String>) -> Self {
        self.push(Ok(StepOutcome::FinalAnswer(text.into())))
    }

    /// Queue a tool call request
    pub fn tool_call(self, request: ToolCallRequest) -> Self {
        self.push(Ok(StepOutcome::ToolCall(request)))
    }

    /// Queue a backend failure
    pub fn fail(self, error: AgentError) -> Self {
        self.push(Err(error))
    }

    /// Once the script runs out, request this tool call on every step
    pub fn always_tool_call(mut self, request: ToolCallRequest) -> Self {
        self.repeat = Some(request);
        self
    }

    /// Sleep before every step
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter of `step` calls made so far
    pub fn step_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.steps)
    }

    fn push(self, step: Result<StepOutcome>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(step);
        }
        self
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn options(&self) -> &GenerationOptions {
        &self.options
    }

    async fn step(&self, _history: &History, _tools: &[ToolSpec]) -> Result<StepOutcome> {
        self.steps.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .script
            .lock()
            .map_err(|_| AgentError::Upstream("scripted backend lock poisoned".into()))?
            .pop_front();

        match (next, &self.repeat) {
            (Some(step), _) => step,
            (None, Some(request)) => Ok(StepOutcome::ToolCall(request.clone())),
            (None, None) => Err(AgentError::Upstream("scripted backend has no more steps".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::Arguments;

    #[tokio::test]
    async fn test_script_order() {
        let backend = ScriptedBackend::new()
            .tool_call(ToolCallRequest::new("get_weather", Arguments::new()))
            .answer("done");
        let history = History::new();

        let first = backend.step(&history, &[]).await.unwrap();
        assert!(matches!(first, StepOutcome::ToolCall(ref r) if r.tool_name == "get_weather"));
        assert_eq!(backend.step(&history, &[]).await.unwrap(), StepOutcome::FinalAnswer("done".into()));
        assert!(backend.step(&history, &[]).await.is_err());
        assert_eq!(backend.step_counter().load(Ordering::SeqCst), 3);
    }
}
