//! CLI entrypoint for ube
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod args;
mod logging;
mod output;

use anyhow::{Context, Result, bail};
use args::{Cli, Command, OutputFormat};
use clap::Parser;
use output::ConsoleFormatter;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use ube_application::{
    AuditLog, ChatBackend, HierarchyBuilder, ToolExecutorPort, ToolInvocationLoop,
};
use ube_domain::{Caller, StrategicPlan};
use ube_infrastructure::{
    ConfigLoader, FileConfig, InMemoryMessageStore, JsonlAuditLog, LiteLlmBackend, ToolRegistry,
    TracingAuditLog, register_builtin_tools,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let _log_guard = logging::init(
        cli.verbose,
        config.logging.directory.as_deref().map(Path::new),
    );

    info!("Starting ube");

    let Some(command) = cli.command else {
        bail!("No command given. Use `ube run <plan.json>` or `ube ask <prompt>`.");
    };

    // === Dependency Injection ===
    let backend: Arc<dyn ChatBackend> = Arc::new(LiteLlmBackend::from_config(&config.backend));
    let registry = ToolRegistry::new().with_permission_filter(config.to_permission_filter());
    register_builtin_tools(&registry, config.workspace_root())
        .context("Failed to register built-in tools")?;
    let tools: Arc<dyn ToolExecutorPort> = Arc::new(registry);
    let audit_log = build_audit_log(&config);

    let cancellation = CancellationToken::new();
    spawn_ctrl_c_handler(cancellation.clone());

    match command {
        Command::Run { plan, output } => {
            run_plan(&plan, output, &config, backend, tools, audit_log, cancellation).await
        }
        Command::Ask {
            prompts,
            identity,
            role,
            session,
        } => {
            let session_id = session.unwrap_or_else(|| {
                format!("ask-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S"))
            });
            let agent = ToolInvocationLoop::new(backend, tools, Caller::new(identity, role))
                .with_params(&config.to_execution_params())
                .with_audit_log(audit_log)
                .with_message_store(Arc::new(InMemoryMessageStore::new(session_id)))
                .with_cancellation(cancellation);

            for prompt in &prompts {
                let turn = agent.process(prompt).await?;
                info!(outcome = turn.outcome.as_str(), "Turn finished");
                println!("{}", turn.text);
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        if let Some(path) = &cli.config
            && !path.exists()
        {
            bail!("Config file not found: {}", path.display());
        }
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    let issues = config.validate();
    if !issues.is_empty() {
        let messages: Vec<String> = issues.iter().map(|i| format!("  - {}", i)).collect();
        bail!("Invalid configuration:\n{}", messages.join("\n"));
    }

    Ok(config)
}

fn build_audit_log(config: &FileConfig) -> Arc<dyn AuditLog> {
    if let Some(path) = &config.audit.jsonl_path {
        match JsonlAuditLog::new(path) {
            Some(log) => {
                info!(path = %log.path().display(), "Writing audit trail");
                return Arc::new(log);
            }
            None => warn!(path = %path, "Falling back to tracing audit log"),
        }
    }
    Arc::new(TracingAuditLog)
}

fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            token.cancel();
        }
    });
}

async fn run_plan(
    plan_path: &Path,
    output: OutputFormat,
    config: &FileConfig,
    backend: Arc<dyn ChatBackend>,
    tools: Arc<dyn ToolExecutorPort>,
    audit_log: Arc<dyn AuditLog>,
    cancellation: CancellationToken,
) -> Result<()> {
    let json = std::fs::read_to_string(plan_path)
        .with_context(|| format!("Failed to read plan {}", plan_path.display()))?;
    let plan = StrategicPlan::from_json(&json)
        .with_context(|| format!("Invalid plan {}", plan_path.display()))?;

    info!(plan_id = %plan.plan_id, tasks = plan.tasks.len(), "Executing plan");

    let router = HierarchyBuilder::new(backend, tools)
        .with_params(config.to_execution_params())
        .with_audit_log(audit_log)
        .with_cancellation(cancellation)
        .build();
    let result = router.execute_plan(&plan).await;

    let rendered = match output {
        OutputFormat::Summary => ConsoleFormatter::format_summary(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };
    println!("{}", rendered);

    if !result.is_completed() {
        bail!("Plan {} finished with status {}", result.plan_id, result.status);
    }
    Ok(())
}
