//! Conversation history port

use async_trait::async_trait;
use thiserror::Error;
use ube_domain::{Message, Role};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Message store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to store message: {0}")]
    WriteFailed(String),
}

/// Port for persisting one session's conversation.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Session the stored messages belong to
    fn session_id(&self) -> &str;

    /// Up to `limit` most recent messages, oldest first
    async fn get_history(&self, limit: usize) -> Result<Vec<Message>, StoreError>;

    async fn store_message(&self, role: Role, content: &str) -> Result<(), StoreError>;
}
