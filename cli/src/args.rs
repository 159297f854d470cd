//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for plan results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-task summary with subtask reports
    Summary,
    /// The full plan result as JSON
    Json,
}

/// CLI arguments for ube
#[derive(Parser, Debug)]
#[command(name = "ube")]
#[command(author, version, about = "Hierarchical task orchestration over tool-calling agents")]
#[command(long_about = r#"
ube executes a strategic plan through a hierarchy of agents:

1. Strategic router: routes each task to the handler for its domain
2. Domain handler: decomposes the task into executor subtasks
3. Tactical dispatcher: runs each subtask on a coder, tester, writer or research executor
4. Executors: answer through a bounded tool-calling loop

Configuration files are loaded from (in priority order):
1. UBE_* environment variables (e.g. UBE_BACKEND__MODEL=gpt-4o)
2. --config <path>     Explicit config file
3. ./ube.toml          Project-level config
4. ~/.config/ube/config.toml   Global config

Example:
  ube run plan.json
  ube run plan.json --output json
  ube ask "Store the project language as rust"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a strategic plan read from a JSON file
    Run {
        /// Plan file (`{"plan_id": ..., "tasks": [...]}`)
        plan: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "summary")]
        output: OutputFormat,
    },

    /// Send prompts to a single tool-calling agent, sharing one session
    Ask {
        /// Prompts, processed in order
        #[arg(required = true)]
        prompts: Vec<String>,

        /// Identity checked by the permission filter
        #[arg(long = "as", value_name = "NAME", default_value = "ProjectLeadAgent")]
        identity: String,

        /// Role checked against per-tool allow-lists
        #[arg(long, default_value = "Lead")]
        role: String,

        /// Session id for the conversation history
        #[arg(long)]
        session: Option<String>,
    },
}
