//! Session Management
//!
//! A conversation session owns its history exclusively and shares the agent
//! (backend, tools, limits) with every other session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{History, TurnRole};
use crate::reasoning::{Agent, RunOutcome};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user-facing conversation
pub struct ConversationSession {
    id: SessionId,
    history: History,
    agent: Arc<Agent>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create a new session
    pub fn new(agent: Arc<Agent>) -> Self {
        Self::with_id(SessionId::new(), agent)
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId, agent: Arc<Agent>) -> Self {
        let now = Utc::now();
        Self {
            id,
            history: History::new(),
            agent,
            created_at: now,
            updated_at: now,
        }
    }

    /// Send a user message and return the assistant's reply
    pub async fn run(&mut self, user_input: &str) -> String {
        self.run_detailed(user_input).await.text
    }

    pub async fn run_detailed(&mut self, user_input: &str) -> RunOutcome {
        let outcome = self.agent.run_detailed(&mut self.history, user_input).await;
        self.touch();
        outcome
    }

    /// Discard the history and start over
    pub fn reset(&mut self) {
        tracing::debug!(session = %self.id, turns = self.history.len(), "Resetting session");
        self.history = History::new();
        self.touch();
    }

    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Read-only view of the conversation
    pub const fn history(&self) -> &History {
        &self.history
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Title generated from the first user message
    pub fn title(&self) -> String {
        self.history
            .iter()
            .find(|t| t.role() == TurnRole::User)
            .map(|t| {
                let preview: String = t.content().chars().take(50).collect();
                if t.content().chars().count() > 50 {
                    format!("{preview}...")
                } else {
                    preview
                }
            })
            .unwrap_or_else(|| format!("Session {}", &self.id.0[..8.min(self.id.0.len())]))
    }

    /// Update the activity timestamp
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Turn;
    use crate::mock::ScriptedBackend;
    use crate::registry::ToolRegistry;

    fn agent(backend: ScriptedBackend) -> Arc<Agent> {
        Arc::new(Agent::with_defaults(Arc::new(backend), Arc::new(ToolRegistry::new())))
    }

    #[tokio::test]
    async fn test_run_and_reset() {
        let mut session = ConversationSession::new(agent(
            ScriptedBackend::new().answer("Hello!").answer("Again!"),
        ));

        assert_eq!(session.run("hello").await, "Hello!");
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.title(), "hello");

        session.reset();
        assert!(session.history().is_empty());

        assert_eq!(session.run("hi").await, "Again!");
        assert_eq!(session.history().turns(), [Turn::user("hi"), Turn::assistant("Again!")]);
    }

    #[test]
    fn test_sessions_do_not_share_history() {
        let shared = agent(ScriptedBackend::new());
        let a = ConversationSession::new(Arc::clone(&shared));
        let b = ConversationSession::new(shared);

        assert_ne!(a.id(), b.id());
        assert!(a.title().starts_with("Session "));
    }
}
