//! Context tools: add_context, get_context, clear_context
//!
//! A small key/value memory the executors can write facts into and read back
//! later in the same process. The store is owned by the tools and shared
//! between their bodies.

use super::registry::ToolRegistry;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use ube_application::ports::tool_executor::ToolBody;
use ube_domain::{ParamDecl, ToolArgs, ToolDefinition, ToolError};

/// Tool name constants
pub const ADD_CONTEXT: &str = "add_context";
pub const GET_CONTEXT: &str = "get_context";
pub const CLEAR_CONTEXT: &str = "clear_context";

/// Shared key/value store behind the context tools.
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) -> Result<(), String> {
        let mut entries = self.entries.lock().map_err(|_| "context store poisoned")?;
        entries.insert(key.into(), value.into());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    /// Remove every entry, returning how many were removed.
    pub fn clear(&self) -> Result<usize, String> {
        let mut entries = self.entries.lock().map_err(|_| "context store poisoned")?;
        let count = entries.len();
        entries.clear();
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn string_arg<'a>(args: &'a ToolArgs, name: &str) -> Result<&'a str, String> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing string argument '{}'", name))
}

pub fn add_context_definition() -> ToolDefinition {
    ToolDefinition::from_signature(
        ADD_CONTEXT,
        "Store a key-value pair in context for later retrieval",
        &[
            ParamDecl::new("key", "str").describe("The key to store the value under"),
            ParamDecl::new("value", "str").describe("The value to store"),
        ],
    )
}

pub fn get_context_definition() -> ToolDefinition {
    ToolDefinition::from_signature(
        GET_CONTEXT,
        "Retrieve a value previously stored with add_context",
        &[ParamDecl::new("key", "str").describe("The key to retrieve")],
    )
}

pub fn clear_context_definition() -> ToolDefinition {
    ToolDefinition::from_signature(CLEAR_CONTEXT, "Clear all stored context", &[])
}

/// Register the three context tools over `store`.
pub fn register_context_tools(
    registry: &ToolRegistry,
    store: &ContextStore,
) -> Result<(), ToolError> {
    let add_store = store.clone();
    registry.register(
        add_context_definition(),
        ToolBody::sync(move |args| {
            let key = string_arg(&args, "key")?;
            let value = string_arg(&args, "value")?;
            add_store.insert(key, value)?;
            Ok(json!(format!("Stored: '{}' = '{}'", key, value)))
        }),
    )?;

    let get_store = store.clone();
    registry.register(
        get_context_definition(),
        ToolBody::sync(move |args| {
            let key = string_arg(&args, "key")?;
            Ok(match get_store.get(key) {
                Some(value) => json!(value),
                None => json!(format!("No context found for key: '{}'", key)),
            })
        }),
    )?;

    let clear_store = store.clone();
    registry.register(
        clear_context_definition(),
        ToolBody::sync(move |_| {
            let count = clear_store.clear()?;
            Ok(json!(format!("Context cleared. Removed {} items.", count)))
        }),
    )?;

    Ok(())
}
