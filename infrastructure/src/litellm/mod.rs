//! OpenAI-compatible chat backend (LiteLLM proxy).
//!
//! [`LiteLlmBackend`] implements the `ChatBackend` port over
//! `POST {base_url}/v1/chat/completions`. Wire types and the mapping to and
//! from domain types live in [`protocol`]; the legacy
//! `<call:id|name:{json}>` text encoding is decoded there too and never leaks
//! past this module.

pub mod error;
pub mod gateway;
pub mod protocol;

pub use error::LiteLlmError;
pub use gateway::LiteLlmBackend;
