//! Conversation persistence adapters.

mod message_store;

pub use message_store::InMemoryMessageStore;
