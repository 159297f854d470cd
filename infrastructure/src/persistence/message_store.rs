//! In-memory [`MessageStore`] keyed by session id.
//!
//! Handles created with [`InMemoryMessageStore::for_session`] share one
//! backing map, so several sessions can live side by side in one process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use ube_application::ports::message_store::{MessageStore, StoreError};
use ube_domain::{Message, Role};

type Sessions = Arc<Mutex<HashMap<String, Vec<Message>>>>;

#[derive(Debug, Clone)]
pub struct InMemoryMessageStore {
    session_id: String,
    sessions: Sessions,
}

impl InMemoryMessageStore {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            sessions: Arc::default(),
        }
    }

    /// A handle on another session over the same backing map.
    pub fn for_session(&self, session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            sessions: self.sessions.clone(),
        }
    }

    /// Number of messages stored for this session
    pub async fn len(&self) -> usize {
        self.sessions
            .lock()
            .await
            .get(&self.session_id)
            .map_or(0, Vec::len)
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn get_history(&self, limit: usize) -> Result<Vec<Message>, StoreError> {
        let sessions = self.sessions.lock().await;
        let Some(messages) = sessions.get(&self.session_id) else {
            return Ok(Vec::new());
        };
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }

    async fn store_message(&self, role: Role, content: &str) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .await
            .entry(self.session_id.clone())
            .or_default()
            .push(Message::with_role(role, content));
        Ok(())
    }
}
