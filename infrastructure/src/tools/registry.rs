//! Tool Registry
//!
//! The [`ToolRegistry`] stores tool definitions together with their bodies and
//! implements [`ToolExecutorPort`]. Tools are registered explicitly at startup.
//!
//! # Usage
//!
//! ```ignore
//! use ube_infrastructure::tools::ToolRegistry;
//!
//! let registry = ToolRegistry::new().with_permission_filter(PermissionFilter::default());
//! registry.register(
//!     ToolDefinition::from_signature("get_context", "Read a context entry", &[ParamDecl::new("key", "str")]),
//!     ToolBody::sync(|args| Ok(args["key"].clone())),
//! )?;
//!
//! let caller = Caller::new("CoderExecutor", "Executor");
//! let value = registry.execute("get_context", &caller, args).await?;
//! ```
//!
//! # Execution order
//!
//! 1. Unknown name ⇒ [`ToolError::NotFound`]
//! 2. Caller role outside a non-empty allow-list ⇒ [`ToolError::PermissionDenied`]
//! 3. Sensitive operation with an unauthorized identity ⇒ [`ToolError::Governance`]
//! 4. Argument validation against the derived parameters
//! 5. Caller-role injection, then the body runs
//!
//! A refused call never reaches the body.

use super::schema::JsonSchemaToolConverter;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};
use ube_application::ports::tool_executor::{ToolBody, ToolExecutorPort};
use ube_application::ports::tool_schema::ToolSchemaPort;
use ube_domain::{
    CALLER_ROLE_PARAM, Caller, ExportFormat, PermissionDecision, PermissionFilter, ToolArgs,
    ToolDefinition, ToolError,
};

struct RegisteredTool {
    definition: ToolDefinition,
    body: ToolBody,
}

/// Registry of tool definitions and bodies, gated by roles and the
/// permission filter.
pub struct ToolRegistry {
    tools: RwLock<Vec<RegisteredTool>>,
    permission_filter: PermissionFilter,
    schema_converter: Arc<dyn ToolSchemaPort>,
}

impl ToolRegistry {
    /// Create an empty registry with the default file-mutation filter
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(Vec::new()),
            permission_filter: PermissionFilter::default(),
            schema_converter: Arc::new(JsonSchemaToolConverter),
        }
    }

    pub fn with_permission_filter(mut self, filter: PermissionFilter) -> Self {
        self.permission_filter = filter;
        self
    }

    pub fn with_schema_converter(mut self, converter: Arc<dyn ToolSchemaPort>) -> Self {
        self.schema_converter = converter;
        self
    }

    pub fn permission_filter(&self) -> &PermissionFilter {
        &self.permission_filter
    }

    /// Register a tool. A name that is already taken is rejected.
    pub fn register(&self, definition: ToolDefinition, body: ToolBody) -> Result<(), ToolError> {
        let mut tools = self
            .tools
            .write()
            .map_err(|_| ToolError::execution_failed(&definition.name, "registry lock poisoned"))?;

        if tools.iter().any(|t| t.definition.name == definition.name) {
            return Err(ToolError::AlreadyRegistered(definition.name));
        }

        debug!(
            tool = %definition.name,
            params = definition.parameters.len(),
            is_async = body.is_async(),
            "Registered tool"
        );
        tools.push(RegisteredTool { definition, body });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tools.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, name: &str) -> Option<(ToolDefinition, ToolBody)> {
        let tools = self.tools.read().ok()?;
        tools
            .iter()
            .find(|t| t.definition.name == name)
            .map(|t| (t.definition.clone(), t.body.clone()))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .read()
            .map(|tools| tools.iter().map(|t| t.definition.clone()).collect())
            .unwrap_or_default()
    }

    fn get(&self, name: &str) -> Option<ToolDefinition> {
        self.lookup(name).map(|(definition, _)| definition)
    }

    fn export(&self, format: ExportFormat) -> Vec<Value> {
        self.schema_converter
            .all_tools_schema(&self.definitions(), format)
    }

    async fn execute(
        &self,
        name: &str,
        caller: &Caller,
        mut args: ToolArgs,
    ) -> Result<Value, ToolError> {
        let (definition, body) = self
            .lookup(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        if !definition.permits(&caller.role) {
            warn!(tool = name, caller = %caller, "Tool refused by role gate");
            return Err(ToolError::PermissionDenied {
                tool: definition.name,
                caller_role: caller.role.clone(),
                allowed: definition.allowed_roles.into_iter().collect(),
            });
        }

        match self.permission_filter.check(name, &caller.name) {
            PermissionDecision::Allow => {
                if self.permission_filter.is_sensitive(name) {
                    info!(tool = name, identity = %caller.name, "Sensitive operation approved");
                }
            }
            PermissionDecision::Deny(denial) => {
                warn!(tool = name, identity = %caller.name, "Sensitive operation denied");
                return Err(denial.into());
            }
        }

        definition.validate_arguments(&args)?;

        if definition.injects_caller_role {
            args.insert(
                CALLER_ROLE_PARAM.to_string(),
                Value::String(caller.role.clone()),
            );
        }

        debug!(tool = name, caller = %caller, "Executing tool");
        body.invoke(args)
            .await
            .map_err(|message| ToolError::execution_failed(name, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use ube_domain::ParamDecl;

    fn args(pairs: &[(&str, Value)]) -> ToolArgs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn echo_definition() -> ToolDefinition {
        ToolDefinition::from_signature(
            "echo",
            "Echo a message",
            &[
                ParamDecl::new("message", "str"),
                ParamDecl::new(CALLER_ROLE_PARAM, "str"),
            ],
        )
    }

    fn echo_body() -> ToolBody {
        ToolBody::sync(|args| {
            Ok(json!({
                "message": args.get("message").cloned().unwrap_or(Value::Null),
                "role": args.get(CALLER_ROLE_PARAM).cloned().unwrap_or(Value::Null),
            }))
        })
    }

    fn executor() -> Caller {
        Caller::new("CoderExecutor", "Executor")
    }

    #[tokio::test]
    async fn test_register_and_execute_injects_caller_role() {
        let registry = ToolRegistry::new();
        registry.register(echo_definition(), echo_body()).unwrap();

        let result = registry
            .execute("echo", &executor(), args(&[("message", json!("hi"))]))
            .await
            .unwrap();

        assert_eq!(result, json!({"message": "hi", "role": "Executor"}));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let registry = ToolRegistry::new();
        registry.register(echo_definition(), echo_body()).unwrap();

        let err = registry.register(echo_definition(), echo_body()).unwrap_err();
        assert_eq!(err, ToolError::AlreadyRegistered("echo".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute("missing", &executor(), ToolArgs::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_role_gate_never_invokes_body() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = invocations.clone();
        let registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::from_signature("deploy", "Deploy", &[])
                    .with_allowed_roles(["Lead"]),
                ToolBody::sync(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(json!("deployed"))
                }),
            )
            .unwrap();

        let err = registry
            .execute("deploy", &executor(), ToolArgs::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ToolError::PermissionDenied {
                tool: "deploy".to_string(),
                caller_role: "Executor".to_string(),
                allowed: vec!["Lead".to_string()],
            }
        );
        assert_eq!(invocations.load(Ordering::SeqCst), 0);

        registry
            .execute("deploy", &Caller::new("ProjectLeadAgent", "Lead"), ToolArgs::new())
            .await
            .unwrap();
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permission_filter_gates_sensitive_operations() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = invocations.clone();
        let registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::from_signature("write_file", "Write", &[]),
                ToolBody::sync(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(json!("written"))
                }),
            )
            .unwrap();

        let err = registry
            .execute("write_file", &executor(), ToolArgs::new())
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert!(err.to_string().contains("CoderExecutor"));
        assert!(err.to_string().contains("DocumentationAgent, ProjectLeadAgent"));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);

        let writer = Caller::new("DocumentationAgent", "Lead");
        assert_eq!(
            registry
                .execute("write_file", &writer, ToolArgs::new())
                .await
                .unwrap(),
            json!("written")
        );
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_rejected() {
        let registry = ToolRegistry::new();
        registry.register(echo_definition(), echo_body()).unwrap();

        let missing = registry
            .execute("echo", &executor(), ToolArgs::new())
            .await
            .unwrap_err();
        assert!(matches!(missing, ToolError::InvalidArguments { .. }));

        let wrong_type = registry
            .execute("echo", &executor(), args(&[("message", json!(42))]))
            .await
            .unwrap_err();
        assert!(matches!(wrong_type, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_async_body_and_failure_mapping() {
        let registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::from_signature("slow", "Slow tool", &[]),
                ToolBody::asynchronous(|_| Box::pin(async { Ok(json!("done")) })),
            )
            .unwrap();
        registry
            .register(
                ToolDefinition::from_signature("broken", "Broken tool", &[]),
                ToolBody::sync(|_| Err("disk full".to_string())),
            )
            .unwrap();

        assert_eq!(
            registry
                .execute("slow", &executor(), ToolArgs::new())
                .await
                .unwrap(),
            json!("done")
        );
        assert_eq!(
            registry
                .execute("broken", &executor(), ToolArgs::new())
                .await
                .unwrap_err(),
            ToolError::execution_failed("broken", "disk full")
        );
    }

    #[test]
    fn test_export_reflects_current_contents() {
        let registry = ToolRegistry::new();
        assert!(registry.export(ExportFormat::JsonSchema).is_empty());

        registry.register(echo_definition(), echo_body()).unwrap();
        registry
            .register(
                ToolDefinition::from_signature("add_context", "Add", &[]),
                ToolBody::sync(|_| Ok(Value::Null)),
            )
            .unwrap();

        let exported = registry.export(ExportFormat::OpenAiFunction);
        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0]["function"]["name"], "add_context");
        assert_eq!(exported, registry.export(ExportFormat::OpenAiFunction));

        // registration order is kept for definitions
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["echo", "add_context"]);
    }
}
