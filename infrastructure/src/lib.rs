//! Infrastructure layer for ube
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the tool registry and reference tools, the
//! OpenAI-compatible chat backend, audit logs, the in-memory message store
//! and configuration file loading.

pub mod config;
pub mod litellm;
pub mod logging;
pub mod persistence;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAuditConfig, FileBackendConfig, FileConfig,
    FileExecutionConfig, FileGovernanceConfig, FileLoggingConfig,
};
pub use litellm::{LiteLlmBackend, LiteLlmError};
pub use logging::{JsonlAuditLog, TracingAuditLog};
pub use persistence::InMemoryMessageStore;
pub use tools::{
    ContextStore, JsonSchemaToolConverter, ToolRegistry, register_builtin_tools,
    register_context_tools, register_file_tools,
};
