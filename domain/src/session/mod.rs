//! Conversation session domain.
//!
//! - [`entities::Message`] — a single history entry (user, assistant, tool call, tool result)
//! - [`response::Completion`] — what the model backend returns for one chat call

pub mod entities;
pub mod response;
