//! Application State

use std::collections::HashMap;
use std::sync::Arc;

use agent_core::{Agent, ConversationSession, SessionId};
use tokio::sync::{Mutex, RwLock};

/// A session behind its own lock, so runs within it are strictly sequential
pub type SharedSession = Arc<Mutex<ConversationSession>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Loop driver shared by every session (backend + tool registry)
    pub agent: Arc<Agent>,

    /// Live conversations keyed by id
    pub sessions: Arc<RwLock<HashMap<SessionId, SharedSession>>>,
}

impl AppState {
    pub fn new(agent: Arc<Agent>) -> Self {
        Self {
            agent,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn create_session(&self) -> (SessionId, SharedSession) {
        let session = ConversationSession::new(self.agent.clone());
        let id = session.id().clone();
        let shared = Arc::new(Mutex::new(session));

        self.sessions.write().await.insert(id.clone(), shared.clone());
        tracing::debug!(session = %id, "Created session");
        (id, shared)
    }

    /// Drop a session; `false` when the id is unknown
    pub async fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(&SessionId::from_string(id)).is_some();
        if removed {
            tracing::debug!(session = id, "Removed session");
        }
        removed
    }

    pub async fn session(&self, id: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(&SessionId::from_string(id)).cloned()
    }

    /// Look up `id`, or start a new session when it is absent or unknown
    pub async fn session_or_create(&self, id: Option<&str>) -> (SessionId, SharedSession) {
        if let Some(id) = id {
            if let Some(session) = self.session(id).await {
                return (SessionId::from_string(id), session);
            }
            tracing::debug!(session = id, "Unknown session id, starting a new one");
        }
        self.create_session().await
    }
}
