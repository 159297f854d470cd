//! File operation tools: write_file
//!
//! `write_file` is the canonical file-mutation operation and is gated by the
//! permission filter. Paths are resolved under a workspace root; absolute
//! paths and paths climbing out of the root are refused.

use super::registry::ToolRegistry;
use serde_json::{Value, json};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use ube_application::ports::tool_executor::ToolBody;
use ube_domain::{ParamDecl, ToolDefinition, ToolError};

/// Tool name constant
pub const WRITE_FILE: &str = "write_file";

/// Get the tool definition for write_file
pub fn write_file_definition() -> ToolDefinition {
    ToolDefinition::from_signature(
        WRITE_FILE,
        "Write content to a file within the workspace. Creates parent directories and overwrites existing files.",
        &[
            ParamDecl::new("file_path", "str")
                .describe("Relative path to the file within the workspace"),
            ParamDecl::new("content", "str").describe("Content to write to the file"),
        ],
    )
}

/// Resolve `relative` under `root`, refusing anything that would land outside it.
pub fn resolve_in_workspace(root: &Path, relative: &str) -> Result<PathBuf, String> {
    let candidate = Path::new(relative);
    let mut resolved = PathBuf::new();

    for component in candidate.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(outside_root(relative));
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(outside_root(relative)),
        }
    }

    if resolved.as_os_str().is_empty() {
        return Err(format!("Invalid path: '{}'", relative));
    }

    Ok(root.join(resolved))
}

fn outside_root(path: &str) -> String {
    format!(
        "Security Error: Access denied. Path '{}' is outside the workspace root.",
        path
    )
}

/// Register `write_file` writing under `workspace_root`.
pub fn register_file_tools(
    registry: &ToolRegistry,
    workspace_root: impl Into<PathBuf>,
) -> Result<(), ToolError> {
    let root = workspace_root.into();

    registry.register(
        write_file_definition(),
        ToolBody::asynchronous(move |args| {
            let root = root.clone();
            Box::pin(async move {
                let file_path = args
                    .get("file_path")
                    .and_then(Value::as_str)
                    .ok_or("missing string argument 'file_path'")?;
                let content = args
                    .get("content")
                    .and_then(Value::as_str)
                    .ok_or("missing string argument 'content'")?;

                let target = resolve_in_workspace(&root, file_path)?;
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| format!("Failed to create parent directories: {}", e))?;
                }
                tokio::fs::write(&target, content)
                    .await
                    .map_err(|e| format!("Failed to write file: {}", e))?;

                debug!(path = %target.display(), bytes = content.len(), "Wrote file");
                Ok(json!(format!(
                    "Successfully wrote {} bytes to {}",
                    content.len(),
                    file_path
                )))
            })
        }),
    )
}
