//! Tool Executor port
//!
//! Defines how the application layer discovers and executes tools, and the
//! shape of a tool body.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use ube_domain::{Caller, ExportFormat, ToolArgs, ToolDefinition, ToolError};

/// Future returned by an async tool body.
pub type ToolFuture = BoxFuture<'static, Result<Value, String>>;

type SyncFn = dyn Fn(ToolArgs) -> Result<Value, String> + Send + Sync;
type AsyncFn = dyn Fn(ToolArgs) -> ToolFuture + Send + Sync;

/// The invocable part of a tool. Both variants are dispatched uniformly
/// through [`ToolBody::invoke`].
#[derive(Clone)]
pub enum ToolBody {
    Sync(Arc<SyncFn>),
    Async(Arc<AsyncFn>),
}

impl ToolBody {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(ToolArgs) -> Result<Value, String> + Send + Sync + 'static,
    {
        ToolBody::Sync(Arc::new(f))
    }

    pub fn asynchronous<F>(f: F) -> Self
    where
        F: Fn(ToolArgs) -> ToolFuture + Send + Sync + 'static,
    {
        ToolBody::Async(Arc::new(f))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, ToolBody::Async(_))
    }

    /// Run the body, awaiting it when async.
    pub async fn invoke(&self, args: ToolArgs) -> Result<Value, String> {
        match self {
            ToolBody::Sync(f) => f(args),
            ToolBody::Async(f) => f(args).await,
        }
    }
}

impl std::fmt::Debug for ToolBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolBody::Sync(_) => write!(f, "ToolBody::Sync"),
            ToolBody::Async(_) => write!(f, "ToolBody::Async"),
        }
    }
}

/// Port for tool execution
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// All registered definitions, in registration order
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Definition of a specific tool
    fn get(&self, name: &str) -> Option<ToolDefinition> {
        self.definitions().into_iter().find(|d| d.name == name)
    }

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Export every definition in `format`
    fn export(&self, format: ExportFormat) -> Vec<Value>;

    /// Execute `name` on behalf of `caller`.
    async fn execute(
        &self,
        name: &str,
        caller: &Caller,
        args: ToolArgs,
    ) -> Result<Value, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_sync_and_async_bodies_invoke_uniformly() {
        let sync = ToolBody::sync(|args| Ok(json!(args.len())));
        let asynchronous = ToolBody::asynchronous(|args| {
            Box::pin(async move { Ok(json!(format!("{} args", args.len()))) })
        });

        let mut args = ToolArgs::new();
        args.insert("key".to_string(), json!("value"));

        assert!(!sync.is_async());
        assert!(asynchronous.is_async());
        assert_eq!(sync.invoke(args.clone()).await.unwrap(), json!(1));
        assert_eq!(asynchronous.invoke(args).await.unwrap(), json!("1 args"));
    }

    #[tokio::test]
    async fn test_body_error_is_returned() {
        let failing = ToolBody::sync(|_| Err("disk full".to_string()));
        assert_eq!(failing.invoke(ToolArgs::new()).await.unwrap_err(), "disk full");
    }
}
