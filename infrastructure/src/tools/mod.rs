//! Tool implementations for the orchestration engine
//!
//! - `registry`: the [`ToolRegistry`] adapter behind `ToolExecutorPort`
//! - `schema`: definition export in JSON Schema / OpenAI / plain form
//! - `context`: key/value context tools (sync bodies)
//! - `file`: workspace-rooted `write_file` (async body, permission-gated)

pub mod context;
pub mod file;
pub mod schema;

mod registry;

pub use context::{ContextStore, register_context_tools};
pub use file::{WRITE_FILE, register_file_tools};
pub use registry::ToolRegistry;
pub use schema::JsonSchemaToolConverter;

use std::path::PathBuf;
use ube_domain::ToolError;

/// Register every reference tool: the context tools over a fresh store and
/// `write_file` rooted at `workspace_root`.
pub fn register_builtin_tools(
    registry: &ToolRegistry,
    workspace_root: impl Into<PathBuf>,
) -> Result<ContextStore, ToolError> {
    let store = ContextStore::new();
    register_context_tools(registry, &store)?;
    register_file_tools(registry, workspace_root)?;
    Ok(store)
}
