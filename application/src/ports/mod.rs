//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod audit_log;
pub mod chat_backend;
pub mod message_store;
pub mod tool_executor;
pub mod tool_schema;
